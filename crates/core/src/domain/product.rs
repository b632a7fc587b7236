//! Product documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, StoreId};

/// A product within a seller's store.
///
/// `inventory` of `None` means stock is untracked (unlimited); checkout only
/// checks and decrements counts that are present. Variant-level counts live
/// in `variant_stock`, keyed as `"Axis: Value / Axis: Value"` with axes in
/// sorted order (see [`crate::CartItem::variant_key`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price in the store currency.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_stock: Option<BTreeMap<String, i64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Remaining stock for a variant key, if tracked.
    #[must_use]
    pub fn variant_inventory(&self, key: &str) -> Option<i64> {
        self.variant_stock.as_ref()?.get(key).copied()
    }
}
