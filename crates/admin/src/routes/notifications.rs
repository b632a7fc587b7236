//! Seller notification inbox.

use axum::Json;
use axum::extract::{Path, State};
use shoplane_backend::datastore::{Filter, collections};
use shoplane_core::Notification;
use shoplane_core::types::NotificationId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireSeller;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
) -> Result<Json<Vec<Notification>>> {
    let mut notifications: Vec<Notification> = state
        .datastore()
        .query(
            collections::NOTIFICATIONS,
            &Filter::new().field("recipient_id", seller.id.to_string()),
        )
        .await?;
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(notifications))
}

#[instrument(skip_all, fields(notification_id = %id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>> {
    let mut notification: Notification = state
        .datastore()
        .get(collections::NOTIFICATIONS, id.as_uuid())
        .await?
        .filter(|n: &Notification| n.recipient_id == seller.id.as_uuid())
        .ok_or_else(|| AppError::NotFound(format!("notification {id}")))?;

    notification.read = true;
    state
        .datastore()
        .put(collections::NOTIFICATIONS, id.as_uuid(), &notification)
        .await?;
    Ok(Json(notification))
}
