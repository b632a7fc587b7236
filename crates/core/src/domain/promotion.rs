//! Promotion documents: discount codes with eligibility conditions and
//! usage limits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    ApplicationType, BuyerId, DiscountType, Email, OrderId, ProductId, PromotionId, StoreId,
};

/// A discount code scoped to one store.
///
/// `code` is stored uppercase-normalized; lookups normalize the submitted
/// code the same way, making the match case-insensitive.
///
/// Invariant: `current_uses` never exceeds `conditions.max_total_uses` when
/// the latter is set. Both the counter and `usage_history` are mutated only
/// inside the order transaction, in the same atomic unit that creates the
/// order referencing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub store_id: StoreId,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent (0-100) for `Percentage`, amount for `Fixed`, unused for
    /// `FreeShipping`.
    pub discount_value: Decimal,
    pub application_type: ApplicationType,
    /// Products the discount base covers when `application_type` is
    /// `SpecificProducts`.
    #[serde(default)]
    pub applicable_product_ids: Vec<ProductId>,
    #[serde(default)]
    pub conditions: PromotionConditions,
    #[serde(default)]
    pub current_uses: u32,
    /// Append-only record of successful redemptions.
    #[serde(default)]
    pub usage_history: Vec<PromotionUsage>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Eligibility conditions attached to a promotion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_uses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses_per_customer: Option<u32>,
    /// Seller-facing flag restricting the code to recently added products.
    /// Carried on the document; display-time concern only.
    #[serde(default)]
    pub new_products_only: bool,
}

/// One redemption in a promotion's usage history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<BuyerId>,
    pub buyer_email: Email,
    pub order_id: OrderId,
    pub used_at: DateTime<Utc>,
}

impl Promotion {
    /// Normalize a submitted code for case-insensitive comparison.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Count prior redemptions by the given customer.
    ///
    /// A usage counts when its buyer ID matches, or when its normalized
    /// email matches. With neither an ID nor an email to compare against
    /// the customer is anonymous and the count is zero.
    #[must_use]
    pub fn uses_by_customer(&self, buyer_id: Option<BuyerId>, email: Option<&Email>) -> u32 {
        let email = email.map(Email::normalized);
        let count = self
            .usage_history
            .iter()
            .filter(|usage| {
                let id_match = buyer_id.is_some() && usage.buyer_id == buyer_id;
                let email_match = email
                    .as_deref()
                    .is_some_and(|e| usage.buyer_email.normalized() == e);
                id_match || email_match
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn promotion_with_history(history: Vec<PromotionUsage>) -> Promotion {
        Promotion {
            id: PromotionId::generate(),
            store_id: StoreId::generate(),
            code: "SAVE10".to_owned(),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            application_type: ApplicationType::EntireOrder,
            applicable_product_ids: Vec::new(),
            conditions: PromotionConditions::default(),
            current_uses: u32::try_from(history.len()).unwrap(),
            usage_history: history,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn usage(buyer_id: Option<BuyerId>, email: &str) -> PromotionUsage {
        PromotionUsage {
            buyer_id,
            buyer_email: Email::parse(email).unwrap(),
            order_id: OrderId::generate(),
            used_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(Promotion::normalize_code("  save10 "), "SAVE10");
    }

    #[test]
    fn test_uses_by_customer_matches_buyer_id() {
        let buyer = BuyerId::generate();
        let promo = promotion_with_history(vec![
            usage(Some(buyer), "a@example.com"),
            usage(Some(BuyerId::generate()), "b@example.com"),
        ]);
        let email = Email::parse("other@example.com").unwrap();
        assert_eq!(promo.uses_by_customer(Some(buyer), Some(&email)), 1);
    }

    #[test]
    fn test_uses_by_customer_falls_back_to_email() {
        let promo = promotion_with_history(vec![usage(None, "Guest@Example.com")]);
        let email = Email::parse("guest@example.com").unwrap();
        assert_eq!(promo.uses_by_customer(None, Some(&email)), 1);
    }

    #[test]
    fn test_uses_by_customer_no_match() {
        let promo = promotion_with_history(vec![usage(None, "someone@example.com")]);
        let email = Email::parse("nobody@example.com").unwrap();
        assert_eq!(promo.uses_by_customer(None, Some(&email)), 0);
    }

    #[test]
    fn test_uses_by_customer_anonymous_counts_nothing() {
        let promo = promotion_with_history(vec![usage(None, "someone@example.com")]);
        assert_eq!(promo.uses_by_customer(None, None), 0);
    }
}
