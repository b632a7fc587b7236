//! Order management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shoplane_core::{Order, OrderId, OrderStatus, StoreId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::services::orders;
use crate::services::stores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Order>>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let orders = orders::list_orders(state.datastore(), &store).await?;
    Ok(Json(orders))
}

#[instrument(skip_all, fields(store_id = %store_id, order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path((store_id, id)): Path<(StoreId, OrderId)>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let order = orders::update_status(
        state.datastore(),
        state.mailer(),
        &store,
        id,
        payload.status,
    )
    .await?;
    Ok(Json(order))
}
