//! Membership Coordinator
//!
//! Owns organization membership state and the invitation lifecycle. Every
//! mutating operation runs as one transaction that locks the organization
//! row first, so duplicate and capacity checks are evaluated against a
//! consistent snapshot. Notifications are dispatched after commit; a
//! failed dispatch is logged and never fails the operation.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use coterie_common::{Error, RepositoryError};
use coterie_email::EmailService;

use crate::domain::entities::{Invitation, InvitationKind, Membership, Organization, User};
use crate::repository::{
    count_admins_tx, count_members_tx, count_pending_sent_invitations_tx, create_invitation_tx,
    create_membership_tx, create_organization_tx, delete_membership_tx, find_invitation_by_token_tx,
    find_pending_request_tx, find_pending_sent_by_email_tx, find_plan_by_slug_tx,
    find_user_by_email_tx, get_invitation_tx, get_membership_tx, get_user_tx,
    list_admin_emails_tx, lock_organization_tx, mark_invitation_accepted_tx,
    mark_invitation_rejected_tx, mark_invitation_revoked_tx, update_membership_admin_tx,
};

/// Slug of the plan assigned to newly created organizations
const DEFAULT_PLAN_SLUG: &str = "free";

/// Failure kinds for coordinator operations. All are recoverable,
/// user-facing conditions except `Storage`, which indicates a transient
/// database failure and rolls the transaction back.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Acting user is not an admin of this organization")]
    NotAuthorized,

    #[error("Not found")]
    NotFound,

    #[error("User is already a member of this organization")]
    AlreadyMember,

    #[error("A pending invitation already exists")]
    DuplicateRequest,

    #[error("Organization has reached its member limit ({max_users})")]
    CapacityExceeded { max_users: i32 },

    #[error("Admins cannot change their own admin status")]
    SelfDemotionForbidden,

    #[error("Admins cannot remove themselves; leave the organization instead")]
    SelfRemovalForbidden,

    #[error("The last admin cannot leave while other members remain")]
    LastAdmin,

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<RepositoryError> for CoordinatorError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CoordinatorError::NotFound,
            RepositoryError::AlreadyExists => CoordinatorError::DuplicateRequest,
            RepositoryError::Connection(e) => CoordinatorError::Storage(e),
            RepositoryError::InvalidData(msg) => CoordinatorError::Invalid(msg),
        }
    }
}

impl From<CoordinatorError> for Error {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::NotAuthorized => Error::Authorization(err.to_string()),
            CoordinatorError::NotFound => Error::NotFound(err.to_string()),
            CoordinatorError::AlreadyMember
            | CoordinatorError::DuplicateRequest
            | CoordinatorError::CapacityExceeded { .. }
            | CoordinatorError::LastAdmin => Error::Conflict(err.to_string()),
            CoordinatorError::SelfDemotionForbidden | CoordinatorError::SelfRemovalForbidden => {
                Error::Validation(err.to_string())
            }
            CoordinatorError::Invalid(msg) => Error::Validation(msg),
            CoordinatorError::Storage(e) => Error::Database(e),
        }
    }
}

/// Require an admin membership for the acting user
fn ensure_admin(membership: Option<&Membership>) -> Result<(), CoordinatorError> {
    match membership {
        Some(m) if m.admin => Ok(()),
        _ => Err(CoordinatorError::NotAuthorized),
    }
}

/// Enforce the seat ceiling before adding one more occupant.
///
/// Pending sent invitations reserve seats; join requests do not.
fn ensure_capacity(
    member_count: i64,
    pending_sent_count: i64,
    max_users: i32,
) -> Result<(), CoordinatorError> {
    if member_count + pending_sent_count >= i64::from(max_users) {
        return Err(CoordinatorError::CapacityExceeded { max_users });
    }
    Ok(())
}

/// The Membership Coordinator service
#[derive(Clone)]
pub struct MembershipCoordinator {
    pool: PgPool,
    email: Arc<dyn EmailService>,
}

impl MembershipCoordinator {
    pub fn new(pool: PgPool, email: Arc<dyn EmailService>) -> Self {
        Self { pool, email }
    }

    /// A user asks to join an organization.
    ///
    /// Creates a pending `kind=requested` invitation and notifies the
    /// organization's admins.
    pub async fn request_join(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Invitation, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let org = lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if org.individual {
            return Err(CoordinatorError::Invalid(
                "Individual organizations do not accept members".to_string(),
            ));
        }

        let user = get_user_tx(&mut tx, user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        if get_membership_tx(&mut tx, organization_id, user_id)
            .await?
            .is_some()
        {
            return Err(CoordinatorError::AlreadyMember);
        }

        if find_pending_request_tx(&mut tx, organization_id, user_id)
            .await?
            .is_some()
        {
            return Err(CoordinatorError::DuplicateRequest);
        }

        let invitation = Invitation::new_request(organization_id, user.email.clone(), user.id)
            .map_err(|e| CoordinatorError::Invalid(e.to_string()))?;
        let invitation = create_invitation_tx(&mut tx, &invitation).await?;

        let admin_emails = list_admin_emails_tx(&mut tx, organization_id).await?;

        tx.commit().await?;

        tracing::info!(
            organization = %org.slug,
            user = %user.username,
            invitation_id = %invitation.id,
            "join request created"
        );

        self.notify_join_request(&org, &user, &admin_emails).await;

        Ok(invitation)
    }

    /// An admin invites an email address to join.
    ///
    /// The email resolves to an existing user when one matches; otherwise
    /// the invitation holds the raw address until account creation binds
    /// it on acceptance. Pending sent invitations count against
    /// `max_users`.
    pub async fn invite_by_email(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        email: &str,
    ) -> Result<Invitation, CoordinatorError> {
        let email = email.trim().to_lowercase();

        let mut tx = self.pool.begin().await?;

        let org = lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if org.individual {
            return Err(CoordinatorError::Invalid(
                "Individual organizations do not accept members".to_string(),
            ));
        }

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        // Resolve the email to an account if one exists
        let invited_user = find_user_by_email_tx(&mut tx, &email).await?;
        if let Some(ref invited) = invited_user {
            if get_membership_tx(&mut tx, organization_id, invited.id)
                .await?
                .is_some()
            {
                return Err(CoordinatorError::AlreadyMember);
            }
        }

        if find_pending_sent_by_email_tx(&mut tx, organization_id, &email)
            .await?
            .is_some()
        {
            return Err(CoordinatorError::DuplicateRequest);
        }

        let member_count = count_members_tx(&mut tx, organization_id).await?;
        let pending_count = count_pending_sent_invitations_tx(&mut tx, organization_id).await?;
        ensure_capacity(member_count, pending_count, org.max_users)?;

        let invitation =
            Invitation::new_sent(organization_id, email, invited_user.map(|u| u.id))
                .map_err(|e| CoordinatorError::Invalid(e.to_string()))?;
        let invitation = create_invitation_tx(&mut tx, &invitation).await?;

        let inviter = get_user_tx(&mut tx, acting_user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        tx.commit().await?;

        tracing::info!(
            organization = %org.slug,
            invitation_id = %invitation.id,
            "invitation sent"
        );

        self.notify_invitation(&org, &invitation, inviter.display_name())
            .await;

        Ok(invitation)
    }

    /// An admin accepts a user's join request, converting it into a
    /// membership with `admin = false`.
    pub async fn accept_request(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<Membership, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let org = lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        let invitation =
            Self::load_org_invitation(&mut tx, organization_id, invitation_id).await?;
        if invitation.kind != InvitationKind::Requested {
            return Err(CoordinatorError::NotFound);
        }
        // Join requests always carry the requesting user
        let requester_id = invitation.user_id.ok_or(CoordinatorError::NotFound)?;

        // Guarded update: fails with NotFound when already terminal
        mark_invitation_accepted_tx(&mut tx, invitation.id, None).await?;

        // The requester may have been admitted through a sent invitation
        // in the meantime; never create a second membership
        if let Some(existing) = get_membership_tx(&mut tx, organization_id, requester_id).await? {
            tx.commit().await?;
            return Ok(existing);
        }

        // A join request reserves no seat, so re-check capacity here
        let member_count = count_members_tx(&mut tx, organization_id).await?;
        let pending_count = count_pending_sent_invitations_tx(&mut tx, organization_id).await?;
        ensure_capacity(member_count, pending_count, org.max_users)?;

        let membership = Membership::new(organization_id, requester_id, false);
        let membership = create_membership_tx(&mut tx, &membership).await?;

        tx.commit().await?;

        tracing::info!(
            organization = %org.slug,
            user_id = %requester_id,
            "join request accepted"
        );

        Ok(membership)
    }

    /// An admin rejects a user's join request.
    pub async fn reject_request(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<Invitation, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        let invitation =
            Self::load_org_invitation(&mut tx, organization_id, invitation_id).await?;
        if invitation.kind != InvitationKind::Requested {
            return Err(CoordinatorError::NotFound);
        }

        mark_invitation_rejected_tx(&mut tx, invitation.id).await?;
        let invitation = get_invitation_tx(&mut tx, invitation.id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        tx.commit().await?;

        Ok(invitation)
    }

    /// An admin withdraws a pending sent invitation.
    pub async fn revoke_invitation(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<Invitation, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        let invitation =
            Self::load_org_invitation(&mut tx, organization_id, invitation_id).await?;
        if invitation.kind != InvitationKind::Sent {
            return Err(CoordinatorError::NotFound);
        }

        mark_invitation_revoked_tx(&mut tx, invitation.id).await?;
        let invitation = get_invitation_tx(&mut tx, invitation.id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        tx.commit().await?;

        tracing::info!(invitation_id = %invitation.id, "invitation revoked");

        Ok(invitation)
    }

    /// The invited user accepts a sent invitation by its secret token.
    ///
    /// Binds the accepting user when the invitation held only a raw
    /// email. Accepting while already a member marks the invitation
    /// accepted without creating a second membership.
    pub async fn accept_invitation(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Membership, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let invitation = find_invitation_by_token_tx(&mut tx, token)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if invitation.kind != InvitationKind::Sent {
            return Err(CoordinatorError::NotFound);
        }

        let org = lock_organization_tx(&mut tx, invitation.organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        // Re-read under the org lock; the row is now stable
        let invitation = get_invitation_tx(&mut tx, invitation.id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        // An invitation addressed to a known account can only be claimed
        // by that account; raw-email invitations bind whoever holds the
        // secret link
        if let Some(expected) = invitation.user_id {
            if expected != user_id {
                return Err(CoordinatorError::NotFound);
            }
        }

        get_user_tx(&mut tx, user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        mark_invitation_accepted_tx(&mut tx, invitation.id, Some(user_id)).await?;

        if let Some(existing) = get_membership_tx(&mut tx, org.id, user_id).await? {
            tx.commit().await?;
            return Ok(existing);
        }

        let membership = Membership::new(org.id, user_id, false);
        let membership = create_membership_tx(&mut tx, &membership).await?;

        tx.commit().await?;

        tracing::info!(
            organization = %org.slug,
            user_id = %user_id,
            "invitation accepted"
        );

        Ok(membership)
    }

    /// The invited user declines a pending sent invitation.
    pub async fn decline_invitation(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Invitation, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let invitation = find_invitation_by_token_tx(&mut tx, token)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if invitation.kind != InvitationKind::Sent {
            return Err(CoordinatorError::NotFound);
        }

        lock_organization_tx(&mut tx, invitation.organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        if let Some(expected) = invitation.user_id {
            if expected != user_id {
                return Err(CoordinatorError::NotFound);
            }
        }

        mark_invitation_rejected_tx(&mut tx, invitation.id).await?;
        let invitation = get_invitation_tx(&mut tx, invitation.id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        tx.commit().await?;

        Ok(invitation)
    }

    /// An admin grants or withdraws another member's admin flag.
    ///
    /// Changing one's own flag always fails, whichever direction.
    pub async fn set_admin(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        target_user_id: Uuid,
        admin: bool,
    ) -> Result<Membership, CoordinatorError> {
        if target_user_id == acting_user_id {
            return Err(CoordinatorError::SelfDemotionForbidden);
        }

        let mut tx = self.pool.begin().await?;

        lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        get_membership_tx(&mut tx, organization_id, target_user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let membership =
            update_membership_admin_tx(&mut tx, organization_id, target_user_id, admin).await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %target_user_id,
            admin,
            "membership admin flag updated"
        );

        Ok(membership)
    }

    /// An admin removes another member from the organization.
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        acting_user_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), CoordinatorError> {
        if target_user_id == acting_user_id {
            return Err(CoordinatorError::SelfRemovalForbidden);
        }

        let mut tx = self.pool.begin().await?;

        lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let acting_membership = get_membership_tx(&mut tx, organization_id, acting_user_id).await?;
        ensure_admin(acting_membership.as_ref())?;

        get_membership_tx(&mut tx, organization_id, target_user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        delete_membership_tx(&mut tx, organization_id, target_user_id).await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %target_user_id,
            "member removed"
        );

        Ok(())
    }

    /// A member leaves the organization.
    ///
    /// The last admin cannot leave while other members remain; the last
    /// member overall may leave, emptying the organization.
    pub async fn leave(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let org = lock_organization_tx(&mut tx, organization_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if org.individual {
            return Err(CoordinatorError::Invalid(
                "Cannot leave an individual organization".to_string(),
            ));
        }

        let membership = get_membership_tx(&mut tx, organization_id, user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        if membership.admin {
            let admin_count = count_admins_tx(&mut tx, organization_id).await?;
            if admin_count <= 1 {
                let member_count = count_members_tx(&mut tx, organization_id).await?;
                if member_count > 1 {
                    return Err(CoordinatorError::LastAdmin);
                }
            }
        }

        delete_membership_tx(&mut tx, organization_id, user_id).await?;

        tx.commit().await?;

        tracing::info!(
            organization = %org.slug,
            user_id = %user_id,
            "member left"
        );

        Ok(())
    }

    /// Create a group organization; the creator becomes its first admin.
    pub async fn create_organization(
        &self,
        creator_user_id: Uuid,
        name: String,
        slug: Option<String>,
    ) -> Result<Organization, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        get_user_tx(&mut tx, creator_user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let plan = find_plan_by_slug_tx(&mut tx, DEFAULT_PLAN_SLUG)
            .await?
            .ok_or_else(|| {
                CoordinatorError::Invalid(format!("Default plan '{}' is missing", DEFAULT_PLAN_SLUG))
            })?;

        let organization = Organization::new(name, slug, &plan)
            .map_err(|e| CoordinatorError::Invalid(e.to_string()))?;
        let organization = create_organization_tx(&mut tx, &organization).await?;

        let membership = Membership::new(organization.id, creator_user_id, true);
        create_membership_tx(&mut tx, &membership).await?;

        tx.commit().await?;

        tracing::info!(
            organization = %organization.slug,
            creator = %creator_user_id,
            "organization created"
        );

        Ok(organization)
    }

    /// Ensure the user's individual organization exists, creating it if
    /// missing. Called by the account-provisioning flow; idempotent.
    pub async fn ensure_individual_organization(
        &self,
        user_id: Uuid,
    ) -> Result<Organization, CoordinatorError> {
        let mut tx = self.pool.begin().await?;

        let user = get_user_tx(&mut tx, user_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        // An individual org is identified by its sole admin membership
        let existing = sqlx::query_as::<_, Organization>(
            r#"
            SELECT o.id, o.name, o.slug, o.individual, o.private, o.max_users,
                   o.plan_id, o.next_plan_id, o.update_on, o.created_at, o.updated_at
            FROM organizations o
            INNER JOIN memberships m ON o.id = m.organization_id
            WHERE o.individual AND m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(org) = existing {
            return Ok(org);
        }

        let plan = find_plan_by_slug_tx(&mut tx, DEFAULT_PLAN_SLUG)
            .await?
            .ok_or_else(|| {
                CoordinatorError::Invalid(format!("Default plan '{}' is missing", DEFAULT_PLAN_SLUG))
            })?;

        let organization = Organization::new_individual(user.username.clone(), &plan)
            .map_err(|e| CoordinatorError::Invalid(e.to_string()))?;
        let organization = create_organization_tx(&mut tx, &organization).await?;

        let membership = Membership::new(organization.id, user_id, true);
        create_membership_tx(&mut tx, &membership).await?;

        tx.commit().await?;

        Ok(organization)
    }

    /// Fetch an invitation and verify it belongs to the organization.
    async fn load_org_invitation(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<Invitation, CoordinatorError> {
        let invitation = get_invitation_tx(tx, invitation_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        if invitation.organization_id != organization_id {
            return Err(CoordinatorError::NotFound);
        }
        Ok(invitation)
    }

    async fn notify_invitation(&self, org: &Organization, invitation: &Invitation, inviter: &str) {
        if let Err(err) = self
            .email
            .send_organization_invitation(
                &org.name,
                org.id,
                &invitation.token,
                &invitation.email,
                inviter,
            )
            .await
        {
            tracing::warn!(
                error = %err,
                invitation_id = %invitation.id,
                "failed to dispatch invitation email"
            );
        }
    }

    async fn notify_join_request(&self, org: &Organization, requester: &User, admins: &[String]) {
        for admin_email in admins {
            if let Err(err) = self
                .email
                .send_join_request_notice(&org.name, org.id, admin_email, requester.display_name())
                .await
            {
                tracing::warn!(
                    error = %err,
                    organization = %org.slug,
                    "failed to dispatch join request notice"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(admin: bool) -> Membership {
        Membership::new(Uuid::new_v4(), Uuid::new_v4(), admin)
    }

    #[test]
    fn test_ensure_admin_requires_admin_flag() {
        assert!(ensure_admin(Some(&member(true))).is_ok());
        assert!(matches!(
            ensure_admin(Some(&member(false))),
            Err(CoordinatorError::NotAuthorized)
        ));
        assert!(matches!(
            ensure_admin(None),
            Err(CoordinatorError::NotAuthorized)
        ));
    }

    #[test]
    fn test_ensure_capacity_boundaries() {
        // Kill: replace >= with >, + with -
        // Full organization: 2 members, max 2
        assert!(matches!(
            ensure_capacity(2, 0, 2),
            Err(CoordinatorError::CapacityExceeded { max_users: 2 })
        ));
        // One seat free
        assert!(ensure_capacity(1, 0, 2).is_ok());
        // Pending sent invitations reserve the free seat
        assert!(matches!(
            ensure_capacity(1, 1, 2),
            Err(CoordinatorError::CapacityExceeded { .. })
        ));
        // Over capacity (e.g. after a plan downgrade)
        assert!(ensure_capacity(3, 0, 2).is_err());
        // Empty organization
        assert!(ensure_capacity(0, 0, 1).is_ok());
        assert!(ensure_capacity(0, 1, 1).is_err());
    }

    #[test]
    fn test_error_mapping_to_common() {
        use axum::http::StatusCode;

        let err: Error = CoordinatorError::NotAuthorized.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err: Error = CoordinatorError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: Error = CoordinatorError::AlreadyMember.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: Error = CoordinatorError::DuplicateRequest.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: Error = CoordinatorError::CapacityExceeded { max_users: 5 }.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: Error = CoordinatorError::LastAdmin.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: Error = CoordinatorError::SelfDemotionForbidden.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: Error = CoordinatorError::SelfRemovalForbidden.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_capacity_error_carries_limit() {
        let err = ensure_capacity(5, 0, 5).unwrap_err();
        match err {
            CoordinatorError::CapacityExceeded { max_users } => assert_eq!(max_users, 5),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: CoordinatorError = RepositoryError::NotFound.into();
        assert!(matches!(err, CoordinatorError::NotFound));

        let err: CoordinatorError = RepositoryError::AlreadyExists.into();
        assert!(matches!(err, CoordinatorError::DuplicateRequest));

        let err: CoordinatorError = RepositoryError::InvalidData("bad".to_string()).into();
        assert!(matches!(err, CoordinatorError::Invalid(_)));
    }
}
