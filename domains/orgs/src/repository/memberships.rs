//! Membership repository

use crate::domain::entities::Membership;
use coterie_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Membership with joined user details for list responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipWithUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub username: String,
    pub user_name: Option<String>,
    pub user_email: String,
}

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get membership by organization and user
    pub async fn get_by_org_and_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, organization_id, user_id, admin, created_at
            FROM memberships
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List all memberships for an organization with user details,
    /// admins first
    pub async fn list_by_org(&self, organization_id: Uuid) -> Result<Vec<MembershipWithUser>> {
        let memberships = sqlx::query_as::<_, MembershipWithUser>(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.admin, m.created_at,
                   u.username, u.name AS user_name, u.email AS user_email
            FROM memberships m
            INNER JOIN users u ON m.user_id = u.id
            WHERE m.organization_id = $1
            ORDER BY m.admin DESC, u.username ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }
}
