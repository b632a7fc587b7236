//! Seller authentication endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use shoplane_core::types::{SellerId, SessionToken};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: SessionToken,
    pub seller_id: SellerId,
    pub email: String,
}

#[instrument(skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    state
        .identity()
        .sign_up_seller(&payload.email, &payload.password, payload.display_name)
        .await?;
    let (seller, session) = state
        .identity()
        .sign_in_seller(&payload.email, &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: session.token,
            seller_id: seller.id,
            email: seller.email.to_string(),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>> {
    let (seller, session) = state
        .identity()
        .sign_in_seller(&payload.email, &payload.password)
        .await?;
    Ok(Json(SessionResponse {
        token: session.token,
        seller_id: seller.id,
        email: seller.email.to_string(),
    }))
}

#[instrument(skip_all)]
pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode> {
    state.identity().sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
