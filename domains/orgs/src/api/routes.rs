//! Route definitions for the organizations domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{invitations, memberships, organizations};
use super::middleware::OrgsState;

/// Create organization routes
fn organization_routes() -> Router<OrgsState> {
    Router::new()
        .route(
            "/v1/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route("/v1/organizations/{slug}", get(organizations::get_organization))
        .route(
            "/v1/account/organization",
            post(organizations::ensure_individual_organization),
        )
        .route("/v1/plans", get(organizations::list_plans))
}

/// Create membership routes
fn membership_routes() -> Router<OrgsState> {
    Router::new()
        .route(
            "/v1/organizations/{slug}/members",
            get(memberships::list_members),
        )
        .route(
            "/v1/organizations/{slug}/members/{user_id}",
            delete(memberships::remove_member).patch(memberships::update_member),
        )
        .route(
            "/v1/organizations/{slug}/leave",
            post(memberships::leave_organization),
        )
}

/// Create invitation and join-request routes
fn invitation_routes() -> Router<OrgsState> {
    Router::new()
        .route(
            "/v1/organizations/{slug}/join",
            post(invitations::request_join),
        )
        .route(
            "/v1/organizations/{slug}/invitations",
            get(invitations::list_invitations).post(invitations::invite_member),
        )
        .route(
            "/v1/organizations/{slug}/invitations/{invitation_id}",
            delete(invitations::revoke_invitation),
        )
        .route(
            "/v1/organizations/{slug}/invitations/{invitation_id}/accept",
            post(invitations::accept_request),
        )
        .route(
            "/v1/organizations/{slug}/invitations/{invitation_id}/reject",
            post(invitations::reject_request),
        )
        .route(
            "/v1/account/invitations",
            get(invitations::list_my_invitations),
        )
        .route(
            "/v1/invitations/{token}",
            get(invitations::get_invitation_preview),
        )
        .route(
            "/v1/invitations/{token}/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/v1/invitations/{token}/decline",
            post(invitations::decline_invitation),
        )
}

/// Create all organizations domain API routes
pub fn routes() -> Router<OrgsState> {
    Router::new()
        .merge(organization_routes())
        .merge(membership_routes())
        .merge(invitation_routes())
}
