//! Organization API handlers
//!
//! Detail pages show membership state together with read-only plan data;
//! the billing module owns the plans themselves.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use coterie_common::{Error, Result};

use crate::api::middleware::{ActingUser, OrgsState};
use crate::domain::entities::{Organization, Plan};

/// Request for creating an organization
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Display name of the organization
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Optional explicit slug; generated from the name when omitted
    pub slug: Option<String>,
}

/// Query parameters for listing plans
#[derive(Debug, Deserialize, Default)]
pub struct PlanListQuery {
    /// Show plans for individual organizations instead of group plans
    #[serde(default)]
    pub individual: bool,
}

/// Response for organization operations
#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub individual: bool,
    pub private: bool,
    pub max_users: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            slug: org.slug,
            individual: org.individual,
            private: org.private,
            max_users: org.max_users,
            created_at: org.created_at,
        }
    }
}

/// Read-only plan display data
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub name: String,
    pub slug: String,
    pub minimum_users: i32,
    pub base_price: i32,
    pub price_per_user: i32,
    pub annual: bool,
    pub free: bool,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        let free = plan.free();
        Self {
            name: plan.name,
            slug: plan.slug,
            minimum_users: plan.minimum_users,
            base_price: plan.base_price,
            price_per_user: plan.price_per_user,
            annual: plan.annual,
            free,
        }
    }
}

/// Organization detail with plan display and member count
#[derive(Debug, Serialize)]
pub struct OrganizationDetailResponse {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub member_count: i64,
    pub plan: PlanResponse,
    /// Plan taking effect on `update_on`; absent when no change is
    /// scheduled
    pub next_plan: Option<PlanResponse>,
    pub update_on: Option<NaiveDate>,
    pub is_member: bool,
    pub is_admin: bool,
}

/// Organization with the requesting user's admin flag, for listings
#[derive(Debug, Serialize)]
pub struct OrganizationListEntry {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub admin: bool,
}

/// List organizations the acting user belongs to
///
/// **GET /v1/organizations**
pub async fn list_organizations(
    acting: ActingUser,
    State(state): State<OrgsState>,
) -> Result<Json<Vec<OrganizationListEntry>>> {
    let orgs = state.repos.organizations.list_for_user(acting.0).await?;

    let entries = orgs
        .into_iter()
        .map(|(org, admin)| OrganizationListEntry {
            organization: OrganizationResponse::from(org),
            admin,
        })
        .collect();

    Ok(Json(entries))
}

/// Create a group organization; the creator becomes its first admin
///
/// **POST /v1/organizations**
pub async fn create_organization(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>)> {
    request
        .validate()
        .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;

    let organization = state
        .coordinator
        .create_organization(acting.0, request.name, request.slug)
        .await
        .map_err(Error::from)?;

    Ok((StatusCode::CREATED, Json(organization.into())))
}

/// Organization detail with plan display
///
/// **GET /v1/organizations/{slug}**
///
/// Private organizations are only visible to their members.
pub async fn get_organization(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
) -> Result<Json<OrganizationDetailResponse>> {
    let org = state
        .repos
        .organizations
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::NotFound("Organization not found".to_string()))?;

    let membership = state
        .repos
        .memberships
        .get_by_org_and_user(org.id, acting.0)
        .await?;

    if org.private && membership.is_none() {
        return Err(Error::NotFound("Organization not found".to_string()));
    }

    let member_count = state.repos.organizations.member_count(org.id).await?;

    let plan = state
        .repos
        .plans
        .get_by_id(org.plan_id)
        .await?
        .ok_or_else(|| Error::Internal("Organization references a missing plan".to_string()))?;

    let next_plan = if org.plan_change_pending() {
        state.repos.plans.get_by_id(org.next_plan_id).await?
    } else {
        None
    };

    let is_admin = membership.as_ref().map(|m| m.admin).unwrap_or(false);

    Ok(Json(OrganizationDetailResponse {
        is_member: membership.is_some(),
        is_admin,
        member_count,
        plan: plan.into(),
        next_plan: next_plan.map(PlanResponse::from),
        update_on: org.update_on,
        organization: org.into(),
    }))
}

/// Ensure the acting user's individual organization exists
///
/// **POST /v1/account/organization**
///
/// Idempotent; called by the account-provisioning flow.
pub async fn ensure_individual_organization(
    acting: ActingUser,
    State(state): State<OrgsState>,
) -> Result<Json<OrganizationResponse>> {
    let organization = state
        .coordinator
        .ensure_individual_organization(acting.0)
        .await
        .map_err(Error::from)?;

    Ok(Json(organization.into()))
}

/// List public plans for display
///
/// **GET /v1/plans**
pub async fn list_plans(
    State(state): State<OrgsState>,
    Query(query): Query<PlanListQuery>,
) -> Result<Json<Vec<PlanResponse>>> {
    let plans = state.repos.plans.list_available(query.individual).await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_create_organization_request_validation() {
        let valid = CreateOrganizationRequest {
            name: "MuckRake".to_string(),
            slug: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateOrganizationRequest {
            name: "".to_string(),
            slug: None,
        };
        assert!(empty_name.validate().is_err());

        let long_name = CreateOrganizationRequest {
            name: "a".repeat(256),
            slug: None,
        };
        assert!(long_name.validate().is_err());
    }

    #[test]
    fn test_plan_response_free_flag() {
        let plan = Plan {
            id: Uuid::new_v4(),
            name: "Free".to_string(),
            slug: "free".to_string(),
            minimum_users: 1,
            base_price: 0,
            price_per_user: 0,
            feature_level: 0,
            annual: false,
            public: true,
            for_individuals: true,
            for_groups: true,
        };
        let response = PlanResponse::from(plan);
        assert!(response.free);
    }

    #[test]
    fn test_organization_detail_serialization() {
        let now = Utc::now();
        let detail = OrganizationDetailResponse {
            organization: OrganizationResponse {
                id: Uuid::new_v4(),
                name: "MuckRake".to_string(),
                slug: "muckrake".to_string(),
                individual: false,
                private: false,
                max_users: 5,
                created_at: now,
            },
            member_count: 3,
            plan: PlanResponse {
                name: "Organization".to_string(),
                slug: "organization".to_string(),
                minimum_users: 5,
                base_price: 10000,
                price_per_user: 1000,
                annual: false,
                free: false,
            },
            next_plan: None,
            update_on: None,
            is_member: true,
            is_admin: false,
        };

        let json = serde_json::to_string(&detail).unwrap();
        // Flattened organization fields sit at the top level
        assert!(json.contains("\"slug\":\"muckrake\""));
        assert!(json.contains("\"member_count\":3"));
        assert!(json.contains("\"next_plan\":null"));
    }
}
