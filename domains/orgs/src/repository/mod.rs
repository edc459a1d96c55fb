//! Repository implementations for the organizations domain

pub mod invitations;
pub mod memberships;
pub mod organizations;
pub mod plans;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use invitations::InvitationRepository;
pub use memberships::{MembershipRepository, MembershipWithUser};
pub use organizations::OrganizationRepository;
pub use plans::PlanRepository;
pub use transactions::{
    count_admins_tx, count_members_tx, count_pending_sent_invitations_tx, create_invitation_tx,
    create_membership_tx, create_organization_tx, delete_membership_tx, find_invitation_by_token_tx,
    find_pending_request_tx, find_pending_sent_by_email_tx, find_plan_by_slug_tx,
    find_user_by_email_tx, get_invitation_tx, get_membership_tx, get_user_tx,
    list_admin_emails_tx, lock_organization_tx, mark_invitation_accepted_tx,
    mark_invitation_rejected_tx, mark_invitation_revoked_tx, update_membership_admin_tx,
};
pub use users::UserRepository;

/// Combined repository access for the organizations domain
#[derive(Clone)]
pub struct OrgsRepositories {
    pool: PgPool,
    pub organizations: OrganizationRepository,
    pub users: UserRepository,
    pub plans: PlanRepository,
    pub memberships: MembershipRepository,
    pub invitations: InvitationRepository,
}

impl OrgsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            organizations: OrganizationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            plans: PlanRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
