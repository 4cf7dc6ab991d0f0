//! Session extractors.

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use super::handlers::AppState;
use crate::error::{Result, TrackerError};
use crate::remote::{AuthUser, Session};

/// Bearer token of the request, not yet checked with the auth service.
#[derive(Debug, Clone)]
pub struct BearerSession(pub Session);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerSession {
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerSession(Session::new(token)))
            .ok_or(TrackerError::Unauthorized)
    }
}

/// A session the auth service accepted, with its user.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: Session,
    pub user: AuthUser,
}

#[async_trait]
impl FromRequestParts<AppState> for SignedIn {
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let BearerSession(session) = BearerSession::from_request_parts(parts, state).await?;

        let user = state
            .service
            .backend()
            .current_user(&session)
            .await?
            .ok_or(TrackerError::Unauthorized)?;

        Ok(SignedIn { session, user })
    }
}
