//! Membership management API handlers
//!
//! Thin translation over the Membership Coordinator: handlers resolve
//! the organization slug, delegate to the coordinator, and map its
//! failure kinds onto HTTP responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coterie_common::{Error, Result};

use crate::api::middleware::{ActingUser, OrgsState};
use crate::domain::entities::Organization;
use crate::repository::MembershipWithUser;

/// Request for changing a member's admin flag
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub admin: bool,
}

/// Response for membership operations
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Enriched user fields
    pub username: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl From<MembershipWithUser> for MembershipResponse {
    fn from(m: MembershipWithUser) -> Self {
        Self {
            id: m.id,
            organization_id: m.organization_id,
            user_id: m.user_id,
            admin: m.admin,
            created_at: m.created_at,
            username: Some(m.username),
            user_name: m.user_name,
            user_email: Some(m.user_email),
        }
    }
}

/// Resolve an organization slug or fail with 404
pub(crate) async fn resolve_org(state: &OrgsState, slug: &str) -> Result<Organization> {
    state
        .repos
        .organizations
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| Error::NotFound("Organization not found".to_string()))
}

/// List organization members
///
/// **GET /v1/organizations/{slug}/members**
///
/// Any member can view the list; admins sort first.
pub async fn list_members(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<MembershipResponse>>> {
    let org = resolve_org(&state, &slug).await?;

    let membership = state
        .repos
        .memberships
        .get_by_org_and_user(org.id, acting.0)
        .await?;

    if membership.is_none() {
        return Err(Error::Authorization(
            "Access denied: Not a member of this organization".to_string(),
        ));
    }

    let members = state.repos.memberships.list_by_org(org.id).await?;

    Ok(Json(
        members.into_iter().map(MembershipResponse::from).collect(),
    ))
}

/// Update a member's admin flag
///
/// **PATCH /v1/organizations/{slug}/members/{user_id}**
///
/// Admin only; acting on oneself always fails.
pub async fn update_member(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path((slug, user_id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<MembershipResponse>> {
    let org = resolve_org(&state, &slug).await?;

    let membership = state
        .coordinator
        .set_admin(org.id, acting.0, user_id, request.admin)
        .await
        .map_err(Error::from)?;

    // Enrich the response with target user details
    let user = state.repos.users.get_by_id(user_id).await?;

    Ok(Json(MembershipResponse {
        id: membership.id,
        organization_id: membership.organization_id,
        user_id: membership.user_id,
        admin: membership.admin,
        created_at: membership.created_at,
        username: user.as_ref().map(|u| u.username.clone()),
        user_name: user.as_ref().and_then(|u| u.name.clone()),
        user_email: user.map(|u| u.email),
    }))
}

/// Remove a member from the organization
///
/// **DELETE /v1/organizations/{slug}/members/{user_id}**
///
/// Admin only; use the leave endpoint to remove oneself.
pub async fn remove_member(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path((slug, user_id)): Path<(String, Uuid)>,
) -> Result<StatusCode> {
    let org = resolve_org(&state, &slug).await?;

    state
        .coordinator
        .remove_member(org.id, acting.0, user_id)
        .await
        .map_err(Error::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Leave an organization
///
/// **POST /v1/organizations/{slug}/leave**
///
/// The last admin cannot leave while other members remain.
pub async fn leave_organization(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    let org = resolve_org(&state, &slug).await?;

    state
        .coordinator
        .leave(org.id, acting.0)
        .await
        .map_err(Error::from)?;

    Ok(StatusCode::NO_CONTENT)
}
