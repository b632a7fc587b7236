//! Promotion management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use shoplane_core::{Promotion, PromotionId, StoreId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::services::promotions::{self, NewPromotion, PromotionUpdate};
use crate::services::stores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Promotion>>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let promotions = promotions::list_promotions(state.datastore(), &store).await?;
    Ok(Json(promotions))
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
    Json(payload): Json<NewPromotion>,
) -> Result<(StatusCode, Json<Promotion>)> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let promotion = promotions::create_promotion(state.datastore(), &store, payload).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

#[instrument(skip_all, fields(store_id = %store_id, promotion_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, PromotionId)>,
    Json(payload): Json<PromotionUpdate>,
) -> Result<Json<Promotion>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let promotion = promotions::update_promotion(state.datastore(), &store, id, payload).await?;
    Ok(Json(promotion))
}

#[instrument(skip_all, fields(store_id = %store_id, promotion_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, PromotionId)>,
) -> Result<StatusCode> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    promotions::delete_promotion(state.datastore(), &store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(store_id = %store_id, promotion_id = %id))]
pub async fn set_active(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, PromotionId)>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<Promotion>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let promotion =
        promotions::set_active(state.datastore(), &store, id, payload.active).await?;
    Ok(Json(promotion))
}
