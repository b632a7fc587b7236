//! Seller side of store conversations.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use shoplane_backend::datastore::{Filter, collections};
use shoplane_core::types::{AccountRealm, BuyerId, MessageId, NotificationId, NotificationKind};
use shoplane_core::{Message, Notification, OrderId, StoreId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireSeller;
use crate::services::stores;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    /// Narrow to one buyer's conversation; omitted, all of the store's
    /// messages come back.
    #[serde(default)]
    pub buyer_id: Option<BuyerId>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub buyer_id: BuyerId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub body: String,
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<Message>>> {
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;
    let mut filter = Filter::new().field("store_id", store.id.to_string());
    if let Some(buyer_id) = query.buyer_id {
        filter = filter.field("buyer_id", buyer_id.to_string());
    }
    let mut messages: Vec<Message> = state
        .datastore()
        .query(collections::MESSAGES, &filter)
        .await?;
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    Ok(Json(messages))
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn send(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(store_id): Path<StoreId>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let body = payload.body.trim().to_owned();
    if body.is_empty() {
        return Err(AppError::Validation("message body cannot be empty".to_owned()));
    }
    let store = stores::owned_store(state.datastore(), &seller, store_id).await?;

    let message = Message {
        id: MessageId::generate(),
        store_id: store.id,
        buyer_id: payload.buyer_id,
        order_id: payload.order_id,
        sender_realm: AccountRealm::Seller,
        sender_id: seller.id.as_uuid(),
        body,
        sent_at: Utc::now(),
    };
    state
        .datastore()
        .insert(collections::MESSAGES, message.id.as_uuid(), &message)
        .await?;

    // Best-effort buyer notification; the message itself already landed.
    let notification = Notification {
        id: NotificationId::generate(),
        recipient_realm: AccountRealm::Buyer,
        recipient_id: payload.buyer_id.as_uuid(),
        store_id: store.id,
        kind: NotificationKind::NewMessage,
        body: format!("New message from {}", store.name),
        order_id: payload.order_id,
        read: false,
        created_at: Utc::now(),
    };
    if let Err(e) = state
        .datastore()
        .insert(
            collections::NOTIFICATIONS,
            notification.id.as_uuid(),
            &notification,
        )
        .await
    {
        tracing::warn!(error = %e, "failed to write new-message notification");
    }

    Ok((StatusCode::CREATED, Json(message)))
}
