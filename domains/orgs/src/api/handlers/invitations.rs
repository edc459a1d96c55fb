//! Invitation and join-request API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use coterie_common::{Error, Result};

use crate::api::handlers::memberships::{resolve_org, MembershipResponse};
use crate::api::middleware::{ActingUser, OrgsState};
use crate::domain::entities::{Invitation, InvitationKind, Membership};
use crate::domain::state::InvitationState;

/// Request for inviting a new member by email
#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    /// Email address of the user to invite
    #[validate(email)]
    pub email: String,
}

/// Query parameters for listing invitations
#[derive(Debug, Deserialize, Default)]
pub struct InvitationListQuery {
    /// Filter by invitation state (pending, accepted, rejected, revoked)
    pub state: Option<InvitationState>,
    /// Filter by direction (requested, sent)
    pub kind: Option<InvitationKind>,
}

/// Response for invitation operations.
///
/// The secret token never appears here; it only travels in the
/// invitation email.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub user_id: Option<Uuid>,
    pub kind: InvitationKind,
    pub state: InvitationState,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            organization_id: invitation.organization_id,
            email: invitation.email.clone(),
            user_id: invitation.user_id,
            kind: invitation.kind,
            state: invitation.state(),
            created_at: invitation.created_at,
        }
    }
}

async fn membership_response(state: &OrgsState, membership: Membership) -> MembershipResponse {
    // Enrichment is best-effort; the membership itself is the result
    let user = state
        .repos
        .users
        .get_by_id(membership.user_id)
        .await
        .ok()
        .flatten();

    MembershipResponse {
        id: membership.id,
        organization_id: membership.organization_id,
        user_id: membership.user_id,
        admin: membership.admin,
        created_at: membership.created_at,
        username: user.as_ref().map(|u| u.username.clone()),
        user_name: user.as_ref().and_then(|u| u.name.clone()),
        user_email: user.map(|u| u.email),
    }
}

/// Request to join an organization
///
/// **POST /v1/organizations/{slug}/join**
///
/// Creates a pending join request for an admin to review; the
/// organization's admins are notified.
pub async fn request_join(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<InvitationResponse>)> {
    let org = resolve_org(&state, &slug).await?;

    let invitation = state
        .coordinator
        .request_join(org.id, acting.0)
        .await
        .map_err(Error::from)?;

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// Invite a new member by email
///
/// **POST /v1/organizations/{slug}/invitations**
///
/// Admin only. Pending sent invitations count against the
/// organization's seat limit.
pub async fn invite_member(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
    Json(request): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>)> {
    request
        .validate()
        .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;

    let org = resolve_org(&state, &slug).await?;

    let invitation = state
        .coordinator
        .invite_by_email(org.id, acting.0, &request.email)
        .await
        .map_err(Error::from)?;

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// List organization invitations
///
/// **GET /v1/organizations/{slug}/invitations**
///
/// Admin only; supports state and direction filters.
pub async fn list_invitations(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(slug): Path<String>,
    Query(query): Query<InvitationListQuery>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let org = resolve_org(&state, &slug).await?;

    let membership = state
        .repos
        .memberships
        .get_by_org_and_user(org.id, acting.0)
        .await?;

    if !membership.map(|m| m.admin).unwrap_or(false) {
        return Err(Error::Authorization(
            "Access denied: Must be an admin to view invitations".to_string(),
        ));
    }

    let invitations = state
        .repos
        .invitations
        .find_by_org(org.id, query.state, query.kind)
        .await?;

    Ok(Json(
        invitations
            .into_iter()
            .map(InvitationResponse::from)
            .collect(),
    ))
}

/// Accept a join request
///
/// **POST /v1/organizations/{slug}/invitations/{invitation_id}/accept**
///
/// Admin only; converts the request into a membership.
pub async fn accept_request(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path((slug, invitation_id)): Path<(String, Uuid)>,
) -> Result<Json<MembershipResponse>> {
    let org = resolve_org(&state, &slug).await?;

    let membership = state
        .coordinator
        .accept_request(org.id, acting.0, invitation_id)
        .await
        .map_err(Error::from)?;

    Ok(Json(membership_response(&state, membership).await))
}

/// Reject a join request
///
/// **POST /v1/organizations/{slug}/invitations/{invitation_id}/reject**
///
/// Admin only.
pub async fn reject_request(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path((slug, invitation_id)): Path<(String, Uuid)>,
) -> Result<Json<InvitationResponse>> {
    let org = resolve_org(&state, &slug).await?;

    let invitation = state
        .coordinator
        .reject_request(org.id, acting.0, invitation_id)
        .await
        .map_err(Error::from)?;

    Ok(Json(invitation.into()))
}

/// Revoke a pending sent invitation
///
/// **DELETE /v1/organizations/{slug}/invitations/{invitation_id}**
///
/// Admin only; only pending sent invitations can be revoked.
pub async fn revoke_invitation(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path((slug, invitation_id)): Path<(String, Uuid)>,
) -> Result<StatusCode> {
    let org = resolve_org(&state, &slug).await?;

    state
        .coordinator
        .revoke_invitation(org.id, acting.0, invitation_id)
        .await
        .map_err(Error::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Invitation preview shown on the accept page
#[derive(Debug, Serialize)]
pub struct InvitationPreviewResponse {
    pub organization_name: String,
    pub organization_slug: String,
    pub email: String,
    pub state: InvitationState,
}

/// Preview a sent invitation by its secret token
///
/// **GET /v1/invitations/{token}**
///
/// Shown to the invitee before accepting; holding the secret link is
/// the only credential required.
pub async fn get_invitation_preview(
    State(state): State<OrgsState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationPreviewResponse>> {
    let invitation = state
        .repos
        .invitations
        .get_by_token(&token)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    if invitation.kind != InvitationKind::Sent {
        return Err(Error::NotFound("Invitation not found".to_string()));
    }

    let org = state
        .repos
        .organizations
        .get_by_id(invitation.organization_id)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    Ok(Json(InvitationPreviewResponse {
        organization_name: org.name,
        organization_slug: org.slug,
        email: invitation.email.clone(),
        state: invitation.state(),
    }))
}

/// List the acting user's own pending invitations and join requests
///
/// **GET /v1/account/invitations**
pub async fn list_my_invitations(
    acting: ActingUser,
    State(state): State<OrgsState>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let invitations = state
        .repos
        .invitations
        .find_pending_for_user(acting.0)
        .await?;

    Ok(Json(
        invitations
            .into_iter()
            .map(InvitationResponse::from)
            .collect(),
    ))
}

/// Accept a sent invitation by its secret token
///
/// **POST /v1/invitations/{token}/accept**
///
/// The acting user becomes a member; invitations addressed to a raw
/// email bind to the accepting account.
pub async fn accept_invitation(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(token): Path<String>,
) -> Result<Json<MembershipResponse>> {
    let membership = state
        .coordinator
        .accept_invitation(&token, acting.0)
        .await
        .map_err(Error::from)?;

    Ok(Json(membership_response(&state, membership).await))
}

/// Decline a sent invitation by its secret token
///
/// **POST /v1/invitations/{token}/decline**
pub async fn decline_invitation(
    acting: ActingUser,
    State(state): State<OrgsState>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    state
        .coordinator
        .decline_invitation(&token, acting.0)
        .await
        .map_err(Error::from)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_member_request_validation() {
        let valid = InviteMemberRequest {
            email: "test@example.com".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = InviteMemberRequest {
            email: "not-an-email".to_string(),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_invitation_response_excludes_token() {
        let invitation =
            Invitation::new_sent(Uuid::new_v4(), "test@example.com".to_string(), None).unwrap();
        let token = invitation.token.clone();

        let response = InvitationResponse::from(invitation);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"pending\""));
        assert!(json.contains("\"sent\""));
        assert!(!json.contains(&token));
    }

    #[test]
    fn test_invitation_list_query_defaults() {
        let query = InvitationListQuery::default();
        assert!(query.state.is_none());
        assert!(query.kind.is_none());
    }
}
