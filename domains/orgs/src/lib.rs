//! Organizations domain: memberships, invitations, join requests, plan
//! display

pub mod api;
pub mod coordinator;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use coordinator::{CoordinatorError, MembershipCoordinator};
pub use domain::entities::*;
pub use domain::state::{InvitationEvent, InvitationState, InvitationStateMachine, StateError};
// Re-export repository types
pub use repository::{
    count_admins_tx, count_members_tx, count_pending_sent_invitations_tx, create_invitation_tx,
    create_membership_tx, create_organization_tx, delete_membership_tx, find_invitation_by_token_tx,
    find_pending_request_tx, find_pending_sent_by_email_tx, find_plan_by_slug_tx,
    find_user_by_email_tx, get_invitation_tx, get_membership_tx, get_user_tx,
    list_admin_emails_tx, lock_organization_tx, mark_invitation_accepted_tx,
    mark_invitation_rejected_tx, mark_invitation_revoked_tx, update_membership_admin_tx,
    InvitationRepository, MembershipRepository, MembershipWithUser, OrganizationRepository,
    OrgsRepositories, PlanRepository, UserRepository,
};

// Re-export API types
pub use api::routes;
pub use api::{ActingUser, OrgsState};
