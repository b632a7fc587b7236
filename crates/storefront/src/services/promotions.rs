//! Promotion eligibility and discount evaluation.
//!
//! The evaluator is pure over a promotion document, the cart, the customer,
//! and a timestamp; the same functions back the advisory validate endpoint
//! and the authoritative re-check inside the order transaction, so the two
//! can never disagree on the rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shoplane_core::{
    ApplicationType, BuyerId, CartItem, DiscountType, Email, Promotion, StoreId, cart_subtotal,
    round_money,
};
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use thiserror::Error;

/// Why a promotion cannot be applied. Messages are written for display to
/// the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    #[error("promotion code not found")]
    NotFound,

    #[error("this promotion is no longer active")]
    Inactive,

    #[error("this promotion has not started yet")]
    NotStarted,

    #[error("this promotion has expired")]
    Expired,

    #[error("this promotion has reached its usage limit")]
    UsageLimitReached,

    #[error("minimum purchase of {minimum} not met")]
    MinPurchaseNotMet { minimum: Decimal },

    #[error("you have reached the usage limit for this promotion")]
    PerCustomerLimitReached,

    #[error("this promotion does not apply to any item in your cart")]
    NoApplicableItems,
}

/// The customer attempting to redeem, as far as they are known.
///
/// A signed-in buyer has an ID and an email; a guest at checkout has only
/// an email; an anonymous validate call may have neither.
#[derive(Debug, Clone, Copy)]
pub struct CustomerRef<'a> {
    pub buyer_id: Option<BuyerId>,
    pub email: Option<&'a Email>,
}

/// The outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Monetary discount, already rounded. Zero for free-shipping codes.
    pub amount: Decimal,
    pub free_shipping: bool,
}

/// Check every eligibility condition against the given cart and customer.
///
/// # Errors
///
/// Returns the first failing condition, in a fixed order: active flag,
/// start date, end date, total usage cap, minimum purchase, per-customer
/// cap.
pub fn check_eligibility(
    promotion: &Promotion,
    subtotal: Decimal,
    customer: CustomerRef<'_>,
    now: DateTime<Utc>,
) -> Result<(), PromotionError> {
    if !promotion.is_active {
        return Err(PromotionError::Inactive);
    }
    if let Some(start) = promotion.conditions.start_date
        && now < start
    {
        return Err(PromotionError::NotStarted);
    }
    if let Some(end) = promotion.conditions.end_date
        && now > end
    {
        return Err(PromotionError::Expired);
    }
    if let Some(max) = promotion.conditions.max_total_uses
        && promotion.current_uses >= max
    {
        return Err(PromotionError::UsageLimitReached);
    }
    if let Some(minimum) = promotion.conditions.min_purchase_amount
        && subtotal < minimum
    {
        return Err(PromotionError::MinPurchaseNotMet { minimum });
    }
    if let Some(cap) = promotion.conditions.max_uses_per_customer
        && promotion.uses_by_customer(customer.buyer_id, customer.email) >= cap
    {
        return Err(PromotionError::PerCustomerLimitReached);
    }
    Ok(())
}

/// The cart amount the discount applies to: the full subtotal for
/// entire-order promotions, the applicable lines only otherwise.
#[must_use]
pub fn discount_base(promotion: &Promotion, items: &[CartItem]) -> Decimal {
    match promotion.application_type {
        ApplicationType::EntireOrder => cart_subtotal(items),
        ApplicationType::SpecificProducts => items
            .iter()
            .filter(|item| promotion.applicable_product_ids.contains(&item.product_id))
            .map(CartItem::line_total)
            .sum(),
    }
}

/// Compute the discount for an eligible promotion.
///
/// A fixed discount never exceeds its base, so totals cannot go negative.
///
/// # Errors
///
/// Returns `NoApplicableItems` when a specific-products promotion covers
/// nothing in the cart.
pub fn compute_discount(
    promotion: &Promotion,
    items: &[CartItem],
) -> Result<Evaluation, PromotionError> {
    if promotion.application_type == ApplicationType::SpecificProducts
        && !items
            .iter()
            .any(|item| promotion.applicable_product_ids.contains(&item.product_id))
    {
        return Err(PromotionError::NoApplicableItems);
    }

    let base = discount_base(promotion, items);
    let evaluation = match promotion.discount_type {
        DiscountType::Percentage => Evaluation {
            amount: round_money(base * promotion.discount_value / Decimal::from(100)),
            free_shipping: false,
        },
        DiscountType::Fixed => Evaluation {
            amount: round_money(promotion.discount_value.min(base)),
            free_shipping: false,
        },
        DiscountType::FreeShipping => Evaluation {
            amount: Decimal::ZERO,
            free_shipping: true,
        },
    };
    Ok(evaluation)
}

/// Full evaluation: eligibility check, then discount computation.
///
/// # Errors
///
/// Returns the first failing eligibility condition, or a computation
/// rejection such as `NoApplicableItems`.
pub fn evaluate(
    promotion: &Promotion,
    items: &[CartItem],
    customer: CustomerRef<'_>,
    now: DateTime<Utc>,
) -> Result<Evaluation, PromotionError> {
    check_eligibility(promotion, cart_subtotal(items), customer, now)?;
    compute_discount(promotion, items)
}

/// Look up a store's promotion by submitted code, case-insensitively.
///
/// # Errors
///
/// Returns a datastore error on storage failure; an unknown code is
/// `Ok(None)`.
pub async fn lookup(
    datastore: &Datastore,
    store_id: StoreId,
    code: &str,
) -> Result<Option<Promotion>, DatastoreError> {
    let filter = Filter::new()
        .field("store_id", store_id.to_string())
        .field("code", Promotion::normalize_code(code));
    let mut matches: Vec<Promotion> = datastore.query(collections::PROMOTIONS, &filter).await?;
    Ok(matches.pop())
}
