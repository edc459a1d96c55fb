//! Organization repository

use crate::domain::entities::Organization;
use coterie_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find organization by ID
    pub async fn get_by_id(&self, organization_id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, individual, private, max_users,
                   plan_id, next_plan_id, update_on, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find organization by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, individual, private, max_users,
                   plan_id, next_plan_id, update_on, created_at, updated_at
            FROM organizations
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List organizations the user belongs to, with their admin flag
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<(Organization, bool)>> {
        let rows = sqlx::query_as::<_, OrganizationWithAdmin>(
            r#"
            SELECT o.id, o.name, o.slug, o.individual, o.private, o.max_users,
                   o.plan_id, o.next_plan_id, o.update_on, o.created_at, o.updated_at,
                   m.admin
            FROM organizations o
            INNER JOIN memberships m ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY o.slug ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.organization, row.admin))
            .collect())
    }

    /// Count active members of an organization
    pub async fn member_count(&self, organization_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM memberships WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Organization joined with the querying user's admin flag
#[derive(Debug, sqlx::FromRow)]
struct OrganizationWithAdmin {
    #[sqlx(flatten)]
    organization: Organization,
    admin: bool,
}
