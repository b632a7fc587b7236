//! Buyer order history.

use axum::Json;
use axum::extract::{Path, State};
use shoplane_backend::datastore::{Filter, collections};
use shoplane_core::{Order, OrderId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireBuyer;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Vec<Order>>> {
    let mut orders: Vec<Order> = state
        .datastore()
        .query(
            collections::ORDERS,
            &Filter::new().field("buyer_id", buyer.id.to_string()),
        )
        .await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order: Order = state
        .datastore()
        .get(collections::ORDERS, id.as_uuid())
        .await?
        .filter(|order: &Order| order.buyer_id == Some(buyer.id))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}
