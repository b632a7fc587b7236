//! Review eligibility and creation.
//!
//! Only verified purchasers may review: the buyer needs a delivered order
//! from the product's store containing the product, and at most one review
//! per buyer per product. The same check backs the advisory eligibility
//! endpoint and the write path.

use chrono::Utc;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_core::{Buyer, Order, OrderStatus, ProductId, Rating, Review, ReviewId, StoreId};
use thiserror::Error;

/// Why a review cannot be written. Messages are written for display to the
/// buyer.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("you have already reviewed this product")]
    AlreadyReviewed,

    #[error("only buyers with a delivered order for this product can review it")]
    PurchaseRequired,

    #[error("rating must be between 1 and 5")]
    InvalidRating,

    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// Check whether the buyer may review the product.
///
/// # Errors
///
/// Returns `AlreadyReviewed` or `PurchaseRequired` when ineligible, or a
/// datastore error on storage failure.
pub async fn can_review(
    datastore: &Datastore,
    buyer: &Buyer,
    product_id: ProductId,
    store_id: StoreId,
) -> Result<(), ReviewError> {
    let existing: Vec<Review> = datastore
        .query(
            collections::REVIEWS,
            &Filter::new()
                .field("product_id", product_id.to_string())
                .field("buyer_id", buyer.id.to_string()),
        )
        .await?;
    if !existing.is_empty() {
        return Err(ReviewError::AlreadyReviewed);
    }

    let orders: Vec<Order> = datastore
        .query(
            collections::ORDERS,
            &Filter::new()
                .field("store_id", store_id.to_string())
                .field("buyer_id", buyer.id.to_string()),
        )
        .await?;
    let delivered = orders.iter().any(|order| {
        order.status == OrderStatus::Delivered
            && order.items.iter().any(|item| item.product_id == product_id)
    });
    if !delivered {
        return Err(ReviewError::PurchaseRequired);
    }
    Ok(())
}

/// Create a review after re-running the eligibility check.
///
/// # Errors
///
/// Returns `InvalidRating` for a rating outside 1-5, an eligibility error,
/// or a datastore error on storage failure.
pub async fn create_review(
    datastore: &Datastore,
    buyer: &Buyer,
    product_id: ProductId,
    store_id: StoreId,
    rating: u8,
    comment: String,
) -> Result<Review, ReviewError> {
    let rating = Rating::new(rating).map_err(|_| ReviewError::InvalidRating)?;
    can_review(datastore, buyer, product_id, store_id).await?;

    let review = Review {
        id: ReviewId::generate(),
        product_id,
        store_id,
        buyer_id: buyer.id,
        rating,
        comment,
        verified_purchase: true,
        created_at: Utc::now(),
    };
    datastore
        .insert(collections::REVIEWS, review.id.as_uuid(), &review)
        .await?;
    Ok(review)
}

/// All reviews for a product, newest first.
///
/// # Errors
///
/// Returns a datastore error on storage failure.
pub async fn list_reviews(
    datastore: &Datastore,
    product_id: ProductId,
) -> Result<Vec<Review>, ReviewError> {
    let mut reviews: Vec<Review> = datastore
        .query(
            collections::REVIEWS,
            &Filter::new().field("product_id", product_id.to_string()),
        )
        .await?;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(reviews)
}
