//! Message and notification documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    AccountRealm, BuyerId, MessageId, NotificationId, NotificationKind, OrderId, StoreId,
};

/// A message in a store's buyer/seller conversation.
///
/// A conversation is identified by `(store_id, buyer_id)`; `sender_realm`
/// records which side wrote the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub store_id: StoreId,
    /// The buyer side of the conversation, regardless of sender.
    pub buyer_id: BuyerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub sender_realm: AccountRealm,
    /// Buyer or seller ID depending on `sender_realm`.
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// An inbox notification for a buyer or seller.
///
/// Created best-effort as a side effect of checkout, order status changes,
/// and messages; creation failures are logged and never block the primary
/// flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_realm: AccountRealm,
    /// Buyer or seller ID depending on `recipient_realm`.
    pub recipient_id: Uuid,
    pub store_id: StoreId,
    pub kind: NotificationKind,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
