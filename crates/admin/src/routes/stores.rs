//! Store management endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use shoplane_core::{CurrencyCode, Store, StoreSettings};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::services::stores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub settings: StoreSettings,
}

#[derive(Debug, Deserialize)]
pub struct CheckNameQuery {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckNameResponse {
    pub name: String,
    pub available: bool,
}

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
) -> Result<Json<Vec<Store>>> {
    let stores = stores::stores_for_seller(state.datastore(), seller.id).await?;
    Ok(Json(stores))
}

#[instrument(skip_all, fields(name = %payload.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>)> {
    let store = stores::create_store(
        state.datastore(),
        &seller,
        &payload.name,
        payload.description,
        payload.currency,
        payload.settings,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

#[instrument(skip(state, _seller))]
pub async fn check_name(
    State(state): State<AppState>,
    RequireSeller(_seller): RequireSeller,
    Query(query): Query<CheckNameQuery>,
) -> Result<Json<CheckNameResponse>> {
    let available = stores::name_available(state.datastore(), &query.name).await?;
    Ok(Json(CheckNameResponse {
        name: query.name,
        available,
    }))
}
