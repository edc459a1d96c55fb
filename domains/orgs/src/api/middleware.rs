//! Organizations domain state and acting-user extraction

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use coterie_common::Error;

use crate::coordinator::MembershipCoordinator;
use crate::repository::OrgsRepositories;

/// Header set by the identity/session provider in front of this service.
/// Authentication itself happens upstream; this service only consumes
/// the already-authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state for the organizations domain
#[derive(Clone)]
pub struct OrgsState {
    pub repos: OrgsRepositories,
    pub coordinator: MembershipCoordinator,
}

/// The authenticated acting user, as supplied by the identity provider
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub Uuid);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| Error::Authentication("Missing X-User-Id header".to_string()))?
            .to_str()
            .map_err(|_| Error::Authentication("Malformed X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(value)
            .map_err(|_| Error::Authentication("X-User-Id is not a valid UUID".to_string()))?;

        Ok(ActingUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<ActingUser, Error> {
        let (mut parts, _) = request.into_parts();
        ActingUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_valid_user_id() {
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, user_id.to_string())
            .body(())
            .unwrap();

        let acting = extract(request).await.unwrap();
        assert_eq!(acting.0, user_id);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let request = Request::builder().body(()).unwrap();
        let result = extract(request).await;
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[tokio::test]
    async fn test_malformed_uuid_rejected() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        let result = extract(request).await;
        assert!(matches!(result, Err(Error::Authentication(_))));
    }
}
