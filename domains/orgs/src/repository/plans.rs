//! Plan repository
//!
//! Read-only: plan rows are provisioned by the billing module and only
//! displayed alongside membership state here.

use crate::domain::entities::Plan;
use coterie_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find plan by ID
    pub async fn get_by_id(&self, plan_id: Uuid) -> Result<Option<Plan>> {
        let row = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, slug, minimum_users, base_price, price_per_user,
                   feature_level, annual, public, for_individuals, for_groups
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find plan by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Plan>> {
        let row = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, slug, minimum_users, base_price, price_per_user,
                   feature_level, annual, public, for_individuals, for_groups
            FROM plans
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List public plans available to the given organization type
    pub async fn list_available(&self, individual: bool) -> Result<Vec<Plan>> {
        let rows = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, slug, minimum_users, base_price, price_per_user,
                   feature_level, annual, public, for_individuals, for_groups
            FROM plans
            WHERE public
              AND (($1 AND for_individuals) OR (NOT $1 AND for_groups))
            ORDER BY feature_level ASC, name ASC
            "#,
        )
        .bind(individual)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
