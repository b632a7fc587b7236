//! Order documents.
//!
//! Orders are created once, atomically, by the checkout transaction and are
//! immutable afterwards except for `status` and `updated_at`. Item prices
//! and the discount amount are snapshots copied at commit time; later edits
//! to products or promotions never change a stored order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartItem;
use crate::types::{
    BuyerId, DiscountType, Email, OrderId, OrderStatus, PaymentMethod, ProductId, PromotionId,
    StoreId,
};

/// Shipping details collected at checkout.
///
/// `email` doubles as the guest contact address when the buyer is not
/// signed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// The first required field that is missing, if any.
    ///
    /// Checked before any datastore call so validation failures are fully
    /// recoverable by correcting input.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        let required: [(&'static str, &str); 6] = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}

/// A snapshot of one cart line at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price copied from the cart, not referenced from the product.
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<BTreeMap<String, String>>,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            image: item.image.clone(),
            variant: item.variant.clone(),
        }
    }
}

/// Snapshot of the promotion applied to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub promotion_id: PromotionId,
    pub code: String,
    pub discount_type: DiscountType,
    /// Computed discount amount, copied at commit time.
    pub amount: Decimal,
    /// Whether the promotion zeroed the shipping cost.
    #[serde(default)]
    pub free_shipping: bool,
}

/// An order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<BuyerId>,
    pub buyer_email: Email,
    pub is_guest: bool,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<AppliedDiscount>,
    pub store_id: StoreId,
    pub store_name: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Derive a human-readable order number from a timestamp.
///
/// Base-36 of the millisecond timestamp plus a rolling in-process sequence
/// suffix. Monotonic enough for display and support lookups; uniqueness is
/// the order ID's job.
#[must_use]
pub fn next_order_number(at: DateTime<Utc>) -> String {
    let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
    let sequence = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("ORD-{}{sequence:03}", to_base36(millis))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        let digit = usize::try_from(n % 36).unwrap_or(0);
        out.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
