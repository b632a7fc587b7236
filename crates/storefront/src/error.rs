//! Application error type and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shoplane_backend::datastore::DatastoreError;
use shoplane_backend::identity::IdentityError;
use thiserror::Error;

use crate::services::checkout::CheckoutError;
use crate::services::promotions::PromotionError;
use crate::services::reviews::ReviewError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Datastore(#[from] DatastoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Datastore(e) => datastore_status(e),
            Self::Identity(e) => identity_status(e),
            Self::Checkout(e) => checkout_status(e),
            Self::Promotion(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Review(e) => review_status(e),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

fn datastore_status(e: &DatastoreError) -> StatusCode {
    match e {
        DatastoreError::Contention { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn identity_status(e: &IdentityError) -> StatusCode {
    match e {
        IdentityError::InvalidCredentials | IdentityError::NotSignedIn => StatusCode::UNAUTHORIZED,
        IdentityError::AccountExists => StatusCode::CONFLICT,
        IdentityError::InvalidEmail(_) | IdentityError::WeakPassword(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        IdentityError::Hash(_) | IdentityError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn checkout_status(e: &CheckoutError) -> StatusCode {
    match e {
        CheckoutError::EmptyCart
        | CheckoutError::MissingShippingField(_)
        | CheckoutError::InvalidEmail
        | CheckoutError::InvalidQuantity
        | CheckoutError::CartStoreMismatch
        | CheckoutError::Promotion(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::StoreNotFound => StatusCode::NOT_FOUND,
        CheckoutError::ProductUnavailable { .. }
        | CheckoutError::InsufficientStock { .. }
        | CheckoutError::Contention => StatusCode::CONFLICT,
        CheckoutError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn review_status(e: &ReviewError) -> StatusCode {
    match e {
        ReviewError::AlreadyReviewed | ReviewError::PurchaseRequired => StatusCode::FORBIDDEN,
        ReviewError::InvalidRating => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs, not the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
