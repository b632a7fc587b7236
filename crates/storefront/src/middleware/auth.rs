//! Buyer session extractors.
//!
//! Sessions travel as `Authorization: Bearer <token>` headers. Handlers
//! declare the access level they need through their argument list:
//! [`RequireBuyer`] rejects unauthenticated requests with 401, while
//! [`OptionalBuyer`] lets guests through with `None`.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use shoplane_core::Buyer;
use shoplane_core::types::SessionToken;

use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Option<SessionToken> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim()
        .parse()
        .ok()
}

/// The raw session token, for handlers that manage the session itself.
pub struct BearerToken(pub SessionToken);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))
    }
}

/// A verified buyer session. Rejects with 401 when absent or invalid.
pub struct RequireBuyer(pub Buyer);

impl FromRequestParts<AppState> for RequireBuyer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
        let buyer = state
            .identity()
            .authenticated_buyer(token)
            .await
            .map_err(|_| AppError::Unauthorized("invalid or expired session".to_owned()))?;
        Ok(Self(buyer))
    }
}

/// A buyer session when present. A missing or stale token resolves to
/// `None` rather than rejecting, for endpoints that serve guests too.
pub struct OptionalBuyer(pub Option<Buyer>);

impl FromRequestParts<AppState> for OptionalBuyer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        let buyer = state.identity().authenticated_buyer(token).await.ok();
        Ok(Self(buyer))
    }
}
