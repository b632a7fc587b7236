//! Product review endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use shoplane_core::{ProductId, Review, StoreId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalBuyer, RequireBuyer};
use crate::services::reviews::{self, ReviewError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store_id: StoreId,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub store_id: StoreId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub can_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = reviews::list_reviews(state.datastore(), id).await?;
    Ok(Json(reviews))
}

/// Advisory eligibility check. Fails closed: without a valid session the
/// answer is "no", never an error.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn eligibility(
    State(state): State<AppState>,
    OptionalBuyer(buyer): OptionalBuyer,
    Path(id): Path<ProductId>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<EligibilityResponse>> {
    let Some(buyer) = buyer else {
        return Ok(Json(EligibilityResponse {
            can_review: false,
            reason: Some("sign in to review this product".to_owned()),
        }));
    };

    let response = match reviews::can_review(state.datastore(), &buyer, id, query.store_id).await {
        Ok(()) => EligibilityResponse {
            can_review: true,
            reason: None,
        },
        Err(e @ (ReviewError::AlreadyReviewed | ReviewError::PurchaseRequired)) => {
            EligibilityResponse {
                can_review: false,
                reason: Some(e.to_string()),
            }
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(response))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn create(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Path(id): Path<ProductId>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = reviews::create_review(
        state.datastore(),
        &buyer,
        id,
        payload.store_id,
        payload.rating,
        payload.comment,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
