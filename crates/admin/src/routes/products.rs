//! Product management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use shoplane_core::{Product, ProductId, StoreId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::services::products::{self, NewProduct, ProductUpdate};
use crate::services::stores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Signed stock delta; negative values write off stock.
    pub delta: i64,
    /// Variant key to adjust instead of the top-level inventory.
    #[serde(default)]
    pub variant: Option<String>,
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Product>>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let products = products::list_products(state.datastore(), &store).await?;
    Ok(Json(products))
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let product = products::create_product(state.datastore(), &store, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, ProductId)>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let product = products::update_product(state.datastore(), &store, id, payload).await?;
    Ok(Json(product))
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, ProductId)>,
) -> Result<StatusCode> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    products::delete_product(state.datastore(), &store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %id))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, ProductId)>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<Json<Product>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let product = products::adjust_stock(
        state.datastore(),
        &store,
        id,
        payload.delta,
        payload.variant.as_deref(),
    )
    .await?;
    Ok(Json(product))
}
