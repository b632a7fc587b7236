//! Order placement endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shoplane_core::Order;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::OptionalBuyer;
use crate::services::checkout::{self, CheckoutRequest};
use crate::state::AppState;

#[instrument(skip_all, fields(store_id = %payload.store_id, lines = payload.items.len()))]
pub async fn place(
    State(state): State<AppState>,
    OptionalBuyer(buyer): OptionalBuyer,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = checkout::place_order(
        state.datastore(),
        state.mailer(),
        buyer.as_ref(),
        &payload,
    )
    .await?;
    tracing::info!(order_number = %order.order_number, total = %order.total, "order placed");
    Ok((StatusCode::CREATED, Json(order)))
}
