//! Transactional free functions for the organizations domain
//!
//! Every mutating coordinator operation runs inside a single transaction.
//! `lock_organization_tx` must be called first: it takes a `FOR UPDATE`
//! lock on the organization row, so capacity checks, duplicate checks,
//! and writes all evaluate against a consistent snapshot.

use crate::domain::entities::{Invitation, Membership, Organization, Plan, User};
use coterie_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Lock the organization row for the duration of the transaction.
///
/// Serializes all mutating membership/invitation operations per
/// organization.
pub async fn lock_organization_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, slug, individual, private, max_users,
               plan_id, next_plan_id, update_on, created_at, updated_at
        FROM organizations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(organization_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Find a plan by slug within an existing transaction.
pub async fn find_plan_by_slug_tx(
    tx: &mut Transaction<'_, Postgres>,
    slug: &str,
) -> Result<Option<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, name, slug, minimum_users, base_price, price_per_user,
               feature_level, annual, public, for_individuals, for_groups
        FROM plans
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(&mut **tx)
    .await
}

/// Get a user by id within an existing transaction.
pub async fn get_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, name, email, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Find a user by email (case-insensitive) within an existing transaction.
pub async fn find_user_by_email_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, name, email, created_at, updated_at
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(&mut **tx)
    .await
}

/// Get a membership by organization and user within an existing
/// transaction.
pub async fn get_membership_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        r#"
        SELECT id, organization_id, user_id, admin, created_at
        FROM memberships
        WHERE organization_id = $1 AND user_id = $2
        "#,
    )
    .bind(organization_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Count active members of an organization.
pub async fn count_members_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM memberships WHERE organization_id = $1
        "#,
    )
    .bind(organization_id)
    .fetch_one(&mut **tx)
    .await
}

/// Count admins of an organization.
pub async fn count_admins_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM memberships WHERE organization_id = $1 AND admin
        "#,
    )
    .bind(organization_id)
    .fetch_one(&mut **tx)
    .await
}

/// Count pending sent invitations for an organization.
///
/// Only sent invitations reserve seats against `max_users`; join
/// requests do not.
pub async fn count_pending_sent_invitations_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM invitations
        WHERE organization_id = $1
          AND kind = 'sent'
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(organization_id)
    .fetch_one(&mut **tx)
    .await
}

/// Find a user's pending join request for an organization.
pub async fn find_pending_request_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        r#"
        SELECT id, organization_id, email, user_id, kind, token,
               created_at, accepted_at, rejected_at, revoked_at
        FROM invitations
        WHERE organization_id = $1
          AND user_id = $2
          AND kind = 'requested'
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(organization_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Find a pending sent invitation for an email address.
pub async fn find_pending_sent_by_email_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    email: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        r#"
        SELECT id, organization_id, email, user_id, kind, token,
               created_at, accepted_at, rejected_at, revoked_at
        FROM invitations
        WHERE organization_id = $1
          AND LOWER(email) = LOWER($2)
          AND kind = 'sent'
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(organization_id)
    .bind(email)
    .fetch_optional(&mut **tx)
    .await
}

/// Get an invitation by id within an existing transaction.
pub async fn get_invitation_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        r#"
        SELECT id, organization_id, email, user_id, kind, token,
               created_at, accepted_at, rejected_at, revoked_at
        FROM invitations
        WHERE id = $1
        "#,
    )
    .bind(invitation_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Find an invitation by its secret token within an existing transaction.
pub async fn find_invitation_by_token_tx(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        r#"
        SELECT id, organization_id, email, user_id, kind, token,
               created_at, accepted_at, rejected_at, revoked_at
        FROM invitations
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(&mut **tx)
    .await
}

/// List the email addresses of an organization's admins.
pub async fn list_admin_emails_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT u.email
        FROM memberships m
        INNER JOIN users u ON m.user_id = u.id
        WHERE m.organization_id = $1 AND m.admin
        ORDER BY u.email
        "#,
    )
    .bind(organization_id)
    .fetch_all(&mut **tx)
    .await
}

/// Create an organization within an existing transaction.
pub async fn create_organization_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization: &Organization,
) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations
            (id, name, slug, individual, private, max_users,
             plan_id, next_plan_id, update_on, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, name, slug, individual, private, max_users,
                  plan_id, next_plan_id, update_on, created_at, updated_at
        "#,
    )
    .bind(organization.id)
    .bind(&organization.name)
    .bind(&organization.slug)
    .bind(organization.individual)
    .bind(organization.private)
    .bind(organization.max_users)
    .bind(organization.plan_id)
    .bind(organization.next_plan_id)
    .bind(organization.update_on)
    .bind(organization.created_at)
    .bind(organization.updated_at)
    .fetch_one(&mut **tx)
    .await
}

/// Create a membership within an existing transaction.
pub async fn create_membership_tx(
    tx: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> Result<Membership, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO memberships (id, organization_id, user_id, admin, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, organization_id, user_id, admin, created_at
        "#,
    )
    .bind(membership.id)
    .bind(membership.organization_id)
    .bind(membership.user_id)
    .bind(membership.admin)
    .bind(membership.created_at)
    .fetch_one(&mut **tx)
    .await
}

/// Create an invitation within an existing transaction.
pub async fn create_invitation_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation: &Invitation,
) -> Result<Invitation, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        r#"
        INSERT INTO invitations
            (id, organization_id, email, user_id, kind, token,
             created_at, accepted_at, rejected_at, revoked_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, organization_id, email, user_id, kind, token,
                  created_at, accepted_at, rejected_at, revoked_at
        "#,
    )
    .bind(invitation.id)
    .bind(invitation.organization_id)
    .bind(&invitation.email)
    .bind(invitation.user_id)
    .bind(invitation.kind)
    .bind(&invitation.token)
    .bind(invitation.created_at)
    .bind(invitation.accepted_at)
    .bind(invitation.rejected_at)
    .bind(invitation.revoked_at)
    .fetch_one(&mut **tx)
    .await
}

/// Delete a membership within an existing transaction.
///
/// Returns `RepositoryError::NotFound` if no membership row matched.
pub async fn delete_membership_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        DELETE FROM memberships WHERE organization_id = $1 AND user_id = $2
        "#,
    )
    .bind(organization_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Update the admin flag on a membership within an existing transaction.
pub async fn update_membership_admin_tx(
    tx: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    user_id: Uuid,
    admin: bool,
) -> Result<Membership, RepositoryError> {
    sqlx::query_as::<_, Membership>(
        r#"
        UPDATE memberships
        SET admin = $3
        WHERE organization_id = $1 AND user_id = $2
        RETURNING id, organization_id, user_id, admin, created_at
        "#,
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(admin)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Mark an invitation as accepted within an existing transaction,
/// binding the accepting user when the invitation held only an email.
///
/// Returns `RepositoryError::NotFound` if the invitation does not exist
/// or has already reached a terminal state.
pub async fn mark_invitation_accepted_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
    user_id: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET accepted_at = NOW(), user_id = COALESCE(user_id, $2)
        WHERE id = $1
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(invitation_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Mark an invitation as rejected within an existing transaction.
pub async fn mark_invitation_rejected_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET rejected_at = NOW()
        WHERE id = $1
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(invitation_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Mark an invitation as revoked within an existing transaction.
pub async fn mark_invitation_revoked_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET revoked_at = NOW()
        WHERE id = $1
          AND accepted_at IS NULL
          AND rejected_at IS NULL
          AND revoked_at IS NULL
        "#,
    )
    .bind(invitation_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
