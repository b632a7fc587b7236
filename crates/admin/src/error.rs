//! Application error type and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shoplane_backend::datastore::DatastoreError;
use shoplane_backend::identity::IdentityError;
use thiserror::Error;

use crate::services::orders::OrderAdminError;
use crate::services::products::ProductAdminError;
use crate::services::promotions::PromotionAdminError;
use crate::services::stores::StoreAdminError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Datastore(#[from] DatastoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreAdminError),

    #[error(transparent)]
    Product(#[from] ProductAdminError),

    #[error(transparent)]
    Promotion(#[from] PromotionAdminError),

    #[error(transparent)]
    Order(#[from] OrderAdminError),

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
            Self::Datastore(e) => match e {
                DatastoreError::Contention { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Identity(e) => identity_status(e),
            Self::Store(e) => match e {
                StoreAdminError::NameTaken => StatusCode::CONFLICT,
                StoreAdminError::InvalidName(_) => StatusCode::UNPROCESSABLE_ENTITY,
                StoreAdminError::NotFound => StatusCode::NOT_FOUND,
                StoreAdminError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Product(e) => match e {
                ProductAdminError::NotFound => StatusCode::NOT_FOUND,
                ProductAdminError::InvalidPrice | ProductAdminError::NegativeInventory => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ProductAdminError::Contention => StatusCode::CONFLICT,
                ProductAdminError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Promotion(e) => match e {
                PromotionAdminError::NotFound => StatusCode::NOT_FOUND,
                PromotionAdminError::DuplicateCode => StatusCode::CONFLICT,
                PromotionAdminError::InvalidPercentage
                | PromotionAdminError::InvalidValue
                | PromotionAdminError::EmptyCode => StatusCode::UNPROCESSABLE_ENTITY,
                PromotionAdminError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(e) => match e {
                OrderAdminError::NotFound => StatusCode::NOT_FOUND,
                OrderAdminError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
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
