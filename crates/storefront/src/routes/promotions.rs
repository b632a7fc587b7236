//! Advisory promotion validation.
//!
//! This endpoint answers "would this code work right now"; nothing is
//! reserved. The authoritative evaluation happens again inside the order
//! transaction, so a code that validates here can still fail at checkout
//! if state moved underneath it.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shoplane_core::{CartItem, Email, StoreId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::OptionalBuyer;
use crate::services::promotions::{self, CustomerRef, Evaluation, PromotionError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub store_id: StoreId,
    pub code: String,
    pub items: Vec<CartItem>,
    /// Guest email, for per-customer limit checks without a session.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub discount_amount: Decimal,
    pub free_shipping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidateResponse {
    fn accepted(evaluation: Evaluation) -> Self {
        Self {
            valid: true,
            discount_amount: evaluation.amount,
            free_shipping: evaluation.free_shipping,
            reason: None,
        }
    }

    fn rejected(reason: &PromotionError) -> Self {
        Self {
            valid: false,
            discount_amount: Decimal::ZERO,
            free_shipping: false,
            reason: Some(reason.to_string()),
        }
    }
}

#[instrument(skip_all, fields(store_id = %payload.store_id))]
pub async fn validate(
    State(state): State<AppState>,
    OptionalBuyer(buyer): OptionalBuyer,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let Some(promotion) =
        promotions::lookup(state.datastore(), payload.store_id, &payload.code).await?
    else {
        return Ok(Json(ValidateResponse::rejected(&PromotionError::NotFound)));
    };

    let guest_email = match &buyer {
        Some(_) => None,
        None => payload
            .email
            .as_deref()
            .and_then(|raw| Email::parse(raw).ok()),
    };
    let customer = CustomerRef {
        buyer_id: buyer.as_ref().map(|b| b.id),
        email: buyer
            .as_ref()
            .map(|b| &b.email)
            .or(guest_email.as_ref()),
    };

    let response = match promotions::evaluate(&promotion, &payload.items, customer, Utc::now()) {
        Ok(evaluation) => ValidateResponse::accepted(evaluation),
        Err(reason) => ValidateResponse::rejected(&reason),
    };
    Ok(Json(response))
}
