//! Cart line items.
//!
//! A cart exists only on the buyer's side until an order is placed; the
//! platform never persists it. Checkout receives the lines as submitted and
//! snapshots them into the order.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, StoreId};

/// A single line in a buyer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub store_name: String,
    pub name: String,
    /// Unit price in the store currency, as shown to the buyer.
    pub price: Decimal,
    /// Positive quantity.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Selected option per variant axis, e.g. `{"Size": "M", "Color": "Red"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<BTreeMap<String, String>>,
}

impl CartItem {
    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// The variant stock key for this line, if a variant was selected.
    ///
    /// Axes are joined in sorted order as `"Axis: Value / Axis: Value"`,
    /// matching the keys of [`crate::Product::variant_stock`].
    #[must_use]
    pub fn variant_key(&self) -> Option<String> {
        let variant = self.variant.as_ref()?;
        if variant.is_empty() {
            return None;
        }
        Some(
            variant
                .iter()
                .map(|(axis, value)| format!("{axis}: {value}"))
                .collect::<Vec<_>>()
                .join(" / "),
        )
    }
}

/// Sum of line totals over the whole cart.
#[must_use]
pub fn cart_subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::generate(),
            store_id: StoreId::generate(),
            store_name: "demo".to_owned(),
            name: "Widget".to_owned(),
            price: price.parse().unwrap(),
            quantity,
            image: None,
            variant: None,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            item("19.99", 3).line_total(),
            "59.97".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let items = vec![item("10.00", 2), item("5.50", 1)];
        assert_eq!(cart_subtotal(&items), "25.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_variant_key_sorted_axes() {
        let mut it = item("1.00", 1);
        let mut variant = BTreeMap::new();
        variant.insert("Size".to_owned(), "M".to_owned());
        variant.insert("Color".to_owned(), "Red".to_owned());
        it.variant = Some(variant);
        assert_eq!(it.variant_key().unwrap(), "Color: Red / Size: M");
    }

    #[test]
    fn test_variant_key_absent() {
        assert!(item("1.00", 1).variant_key().is_none());
    }
}
