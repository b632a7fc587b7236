//! Buyer side of store conversations.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use shoplane_backend::datastore::{Filter, collections};
use shoplane_core::types::{AccountRealm, MessageId, NotificationId, NotificationKind};
use shoplane_core::{Message, Notification, OrderId, Store, StoreId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireBuyer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub store_id: StoreId,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub store_id: StoreId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub body: String,
}

#[instrument(skip_all, fields(store_id = %query.store_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<Message>>> {
    let mut messages: Vec<Message> = state
        .datastore()
        .query(
            collections::MESSAGES,
            &Filter::new()
                .field("store_id", query.store_id.to_string())
                .field("buyer_id", buyer.id.to_string()),
        )
        .await?;
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    Ok(Json(messages))
}

#[instrument(skip_all, fields(store_id = %payload.store_id))]
pub async fn send(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let body = payload.body.trim().to_owned();
    if body.is_empty() {
        return Err(AppError::Validation("message body cannot be empty".to_owned()));
    }
    let store: Store = state
        .datastore()
        .get(collections::STORES, payload.store_id.as_uuid())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {}", payload.store_id)))?;

    let message = Message {
        id: MessageId::generate(),
        store_id: store.id,
        buyer_id: buyer.id,
        order_id: payload.order_id,
        sender_realm: AccountRealm::Buyer,
        sender_id: buyer.id.as_uuid(),
        body,
        sent_at: Utc::now(),
    };
    state
        .datastore()
        .insert(collections::MESSAGES, message.id.as_uuid(), &message)
        .await?;

    // Best-effort seller notification; the message itself already landed.
    let notification = Notification {
        id: NotificationId::generate(),
        recipient_realm: AccountRealm::Seller,
        recipient_id: store.owner.as_uuid(),
        store_id: store.id,
        kind: NotificationKind::NewMessage,
        body: format!("New message in {}", store.name),
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
