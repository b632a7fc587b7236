//! Promotion management.
//!
//! Sellers create and edit promotion documents; redemption state
//! (`current_uses`, `usage_history`) is owned by the checkout transaction
//! and never written from here.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_core::{
    ApplicationType, DiscountType, ProductId, Promotion, PromotionConditions, PromotionId, Store,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromotionAdminError {
    #[error("promotion not found")]
    NotFound,

    #[error("promotion code cannot be empty")]
    EmptyCode,

    #[error("a promotion with this code already exists in the store")]
    DuplicateCode,

    #[error("percentage discounts must be between 0 and 100")]
    InvalidPercentage,

    #[error("discount value cannot be negative")]
    InvalidValue,

    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

#[derive(Debug, Deserialize)]
pub struct NewPromotion {
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub application_type: ApplicationType,
    #[serde(default)]
    pub applicable_product_ids: Vec<ProductId>,
    #[serde(default)]
    pub conditions: PromotionConditions,
}

/// Partial promotion update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct PromotionUpdate {
    #[serde(default)]
    pub discount_value: Option<Decimal>,
    #[serde(default)]
    pub application_type: Option<ApplicationType>,
    #[serde(default)]
    pub applicable_product_ids: Option<Vec<ProductId>>,
    #[serde(default)]
    pub conditions: Option<PromotionConditions>,
}

fn validate_value(
    discount_type: DiscountType,
    value: Decimal,
) -> Result<(), PromotionAdminError> {
    if value < Decimal::ZERO {
        return Err(PromotionAdminError::InvalidValue);
    }
    if discount_type == DiscountType::Percentage && value > Decimal::from(100) {
        return Err(PromotionAdminError::InvalidPercentage);
    }
    Ok(())
}

/// Create a promotion. The code is normalized to uppercase and must be
/// unique within the store.
///
/// # Errors
///
/// Returns `EmptyCode`, `InvalidValue`, `InvalidPercentage`, or
/// `DuplicateCode` on validation failure, or a datastore error.
pub async fn create_promotion(
    datastore: &Datastore,
    store: &Store,
    payload: NewPromotion,
) -> Result<Promotion, PromotionAdminError> {
    let code = Promotion::normalize_code(&payload.code);
    if code.is_empty() {
        return Err(PromotionAdminError::EmptyCode);
    }
    validate_value(payload.discount_type, payload.discount_value)?;
    if find_by_code(datastore, store, &code).await?.is_some() {
        return Err(PromotionAdminError::DuplicateCode);
    }

    let promotion = Promotion {
        id: PromotionId::generate(),
        store_id: store.id,
        code,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        application_type: payload.application_type,
        applicable_product_ids: payload.applicable_product_ids,
        conditions: payload.conditions,
        current_uses: 0,
        usage_history: Vec::new(),
        is_active: true,
        created_at: Utc::now(),
    };
    datastore
        .insert(collections::PROMOTIONS, promotion.id.as_uuid(), &promotion)
        .await?;
    tracing::info!(code = %promotion.code, "promotion created");
    Ok(promotion)
}

/// Apply a partial update. Redemption counters are untouched.
///
/// # Errors
///
/// Returns `NotFound`, a value validation error, or a datastore error.
pub async fn update_promotion(
    datastore: &Datastore,
    store: &Store,
    promotion_id: PromotionId,
    payload: PromotionUpdate,
) -> Result<Promotion, PromotionAdminError> {
    let mut promotion = load_in_store(datastore, store, promotion_id).await?;
    if let Some(value) = payload.discount_value {
        validate_value(promotion.discount_type, value)?;
        promotion.discount_value = value;
    }
    if let Some(application_type) = payload.application_type {
        promotion.application_type = application_type;
    }
    if let Some(ids) = payload.applicable_product_ids {
        promotion.applicable_product_ids = ids;
    }
    if let Some(conditions) = payload.conditions {
        promotion.conditions = conditions;
    }

    datastore
        .put(collections::PROMOTIONS, promotion.id.as_uuid(), &promotion)
        .await?;
    Ok(promotion)
}

/// Toggle whether the code can be redeemed.
///
/// # Errors
///
/// Returns `NotFound` or a datastore error.
pub async fn set_active(
    datastore: &Datastore,
    store: &Store,
    promotion_id: PromotionId,
    active: bool,
) -> Result<Promotion, PromotionAdminError> {
    let mut promotion = load_in_store(datastore, store, promotion_id).await?;
    promotion.is_active = active;
    datastore
        .put(collections::PROMOTIONS, promotion.id.as_uuid(), &promotion)
        .await?;
    Ok(promotion)
}

/// Delete a promotion. Orders that already redeemed it keep their
/// snapshot.
///
/// # Errors
///
/// Returns `NotFound` or a datastore error.
pub async fn delete_promotion(
    datastore: &Datastore,
    store: &Store,
    promotion_id: PromotionId,
) -> Result<(), PromotionAdminError> {
    load_in_store(datastore, store, promotion_id).await?;
    datastore
        .delete(collections::PROMOTIONS, promotion_id.as_uuid())
        .await?;
    Ok(())
}

/// All promotions in the store, newest first.
///
/// # Errors
///
/// Returns a datastore error on storage failure.
pub async fn list_promotions(
    datastore: &Datastore,
    store: &Store,
) -> Result<Vec<Promotion>, PromotionAdminError> {
    let mut promotions: Vec<Promotion> = datastore
        .query(
            collections::PROMOTIONS,
            &Filter::new().field("store_id", store.id.to_string()),
        )
        .await?;
    promotions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(promotions)
}

async fn find_by_code(
    datastore: &Datastore,
    store: &Store,
    normalized_code: &str,
) -> Result<Option<Promotion>, DatastoreError> {
    let mut matches: Vec<Promotion> = datastore
        .query(
            collections::PROMOTIONS,
            &Filter::new()
                .field("store_id", store.id.to_string())
                .field("code", normalized_code),
        )
        .await?;
    Ok(matches.pop())
}

async fn load_in_store(
    datastore: &Datastore,
    store: &Store,
    promotion_id: PromotionId,
) -> Result<Promotion, PromotionAdminError> {
    datastore
        .get::<Promotion>(collections::PROMOTIONS, promotion_id.as_uuid())
        .await?
        .filter(|promotion| promotion.store_id == store.id)
        .ok_or(PromotionAdminError::NotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shoplane_core::{CurrencyCode, SellerId, StoreId, StoreName, StoreSettings};

    use super::*;

    fn store() -> Store {
        Store {
            id: StoreId::generate(),
            owner: SellerId::generate(),
            name: StoreName::parse("test-shop").unwrap(),
            description: None,
            currency: CurrencyCode::default(),
            settings: StoreSettings::default(),
            created_at: Utc::now(),
        }
    }

    fn percentage(code: &str, value: &str) -> NewPromotion {
        NewPromotion {
            code: code.to_owned(),
            discount_type: DiscountType::Percentage,
            discount_value: value.parse().unwrap(),
            application_type: ApplicationType::EntireOrder,
            applicable_product_ids: Vec::new(),
            conditions: PromotionConditions::default(),
        }
    }

    #[tokio::test]
    async fn test_code_normalized_and_unique_per_store() {
        let datastore = Datastore::new();
        let store = store();
        let created = create_promotion(&datastore, &store, percentage(" save10 ", "10"))
            .await
            .unwrap();
        assert_eq!(created.code, "SAVE10");

        let err = create_promotion(&datastore, &store, percentage("SAVE10", "20"))
            .await
            .unwrap_err();
        assert!(matches!(err, PromotionAdminError::DuplicateCode));

        // The same code in another store is fine.
        assert!(
            create_promotion(&datastore, &self::store(), percentage("SAVE10", "20"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_percentage_bounds() {
        let datastore = Datastore::new();
        let store = store();
        let err = create_promotion(&datastore, &store, percentage("TOOMUCH", "101"))
            .await
            .unwrap_err();
        assert!(matches!(err, PromotionAdminError::InvalidPercentage));

        let err = create_promotion(&datastore, &store, percentage("NEGATIVE", "-5"))
            .await
            .unwrap_err();
        assert!(matches!(err, PromotionAdminError::InvalidValue));
    }

    #[tokio::test]
    async fn test_update_preserves_redemption_state() {
        let datastore = Datastore::new();
        let store = store();
        let mut created = create_promotion(&datastore, &store, percentage("SAVE", "10"))
            .await
            .unwrap();
        created.current_uses = 7;
        datastore
            .put(collections::PROMOTIONS, created.id.as_uuid(), &created)
            .await
            .unwrap();

        let updated = update_promotion(
            &datastore,
            &store,
            created.id,
            PromotionUpdate {
                discount_value: Some("15".parse().unwrap()),
                ..PromotionUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.discount_value, "15".parse().unwrap());
        assert_eq!(updated.current_uses, 7);
    }

    #[tokio::test]
    async fn test_set_active_toggles() {
        let datastore = Datastore::new();
        let store = store();
        let created = create_promotion(&datastore, &store, percentage("SAVE", "10"))
            .await
            .unwrap();
        assert!(created.is_active);

        let disabled = set_active(&datastore, &store, created.id, false).await.unwrap();
        assert!(!disabled.is_active);
    }
}
