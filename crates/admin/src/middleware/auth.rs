//! Seller session extractors.
//!
//! Sessions travel as `Authorization: Bearer <token>` headers. Every admin
//! endpoint except authentication itself requires a seller session; a buyer
//! session is rejected even when the token is valid, because the realms are
//! independent.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use shoplane_core::Seller;
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

/// A verified seller session. Rejects with 401 when absent or invalid.
pub struct RequireSeller(pub Seller);

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
        let seller = state
            .identity()
            .authenticated_seller(token)
            .await
            .map_err(|_| AppError::Unauthorized("invalid or expired session".to_owned()))?;
        Ok(Self(seller))
    }
}
