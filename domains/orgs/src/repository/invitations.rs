//! Invitation repository

use crate::domain::entities::{Invitation, InvitationKind};
use crate::domain::state::InvitationState;
use coterie_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find invitation by ID
    pub async fn get_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, organization_id, email, user_id, kind, token,
                   created_at, accepted_at, rejected_at, revoked_at
            FROM invitations
            WHERE id = $1
            "#,
        )
        .bind(invitation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find invitation by its secret token
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, organization_id, email, user_id, kind, token,
                   created_at, accepted_at, rejected_at, revoked_at
            FROM invitations
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find all invitations for an organization, optionally filtered by
    /// derived state and direction
    pub async fn find_by_org(
        &self,
        organization_id: Uuid,
        state_filter: Option<InvitationState>,
        kind_filter: Option<InvitationKind>,
    ) -> Result<Vec<Invitation>> {
        // The derived state maps onto which terminal timestamp is set
        let sql = match state_filter {
            Some(InvitationState::Pending) => {
                r#"
                SELECT id, organization_id, email, user_id, kind, token,
                       created_at, accepted_at, rejected_at, revoked_at
                FROM invitations
                WHERE organization_id = $1
                  AND ($2::invitation_kind IS NULL OR kind = $2)
                  AND accepted_at IS NULL
                  AND rejected_at IS NULL
                  AND revoked_at IS NULL
                ORDER BY created_at ASC
                "#
            }
            Some(InvitationState::Accepted) => {
                r#"
                SELECT id, organization_id, email, user_id, kind, token,
                       created_at, accepted_at, rejected_at, revoked_at
                FROM invitations
                WHERE organization_id = $1
                  AND ($2::invitation_kind IS NULL OR kind = $2)
                  AND accepted_at IS NOT NULL
                ORDER BY created_at ASC
                "#
            }
            Some(InvitationState::Rejected) => {
                r#"
                SELECT id, organization_id, email, user_id, kind, token,
                       created_at, accepted_at, rejected_at, revoked_at
                FROM invitations
                WHERE organization_id = $1
                  AND ($2::invitation_kind IS NULL OR kind = $2)
                  AND rejected_at IS NOT NULL
                ORDER BY created_at ASC
                "#
            }
            Some(InvitationState::Revoked) => {
                r#"
                SELECT id, organization_id, email, user_id, kind, token,
                       created_at, accepted_at, rejected_at, revoked_at
                FROM invitations
                WHERE organization_id = $1
                  AND ($2::invitation_kind IS NULL OR kind = $2)
                  AND revoked_at IS NOT NULL
                ORDER BY created_at ASC
                "#
            }
            None => {
                r#"
                SELECT id, organization_id, email, user_id, kind, token,
                       created_at, accepted_at, rejected_at, revoked_at
                FROM invitations
                WHERE organization_id = $1
                  AND ($2::invitation_kind IS NULL OR kind = $2)
                ORDER BY created_at ASC
                "#
            }
        };

        let rows = sqlx::query_as::<_, Invitation>(sql)
            .bind(organization_id)
            .bind(kind_filter)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// List a user's own pending invitations and join requests
    pub async fn find_pending_for_user(&self, user_id: Uuid) -> Result<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, organization_id, email, user_id, kind, token,
                   created_at, accepted_at, rejected_at, revoked_at
            FROM invitations
            WHERE user_id = $1
              AND accepted_at IS NULL
              AND rejected_at IS NULL
              AND revoked_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
