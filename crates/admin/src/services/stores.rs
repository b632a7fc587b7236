//! Store creation and ownership checks.
//!
//! Store names are globally unique slugs. Uniqueness is enforced by a
//! query-then-insert check; without a native unique constraint in the
//! datastore a race can slip through, which the original platform accepted
//! for the same reason.

use chrono::Utc;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_core::{
    CurrencyCode, Seller, SellerId, Store, StoreId, StoreName, StoreNameError, StoreSettings,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreAdminError {
    #[error("this store name is already taken")]
    NameTaken,

    #[error(transparent)]
    InvalidName(#[from] StoreNameError),

    #[error("store not found")]
    NotFound,

    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// Resolve a store by its public name slug.
///
/// # Errors
///
/// Returns a datastore error on storage failure; an unknown or unparsable
/// name is `Ok(None)`.
pub async fn find_by_name(
    datastore: &Datastore,
    name: &str,
) -> Result<Option<Store>, DatastoreError> {
    let Ok(name) = StoreName::parse(name) else {
        return Ok(None);
    };
    let mut matches: Vec<Store> = datastore
        .query(
            collections::STORES,
            &Filter::new().field("name", name.as_str()),
        )
        .await?;
    Ok(matches.pop())
}

/// Whether a store name is free to claim.
///
/// # Errors
///
/// Returns `InvalidName` for an unparsable slug, or a datastore error.
pub async fn name_available(datastore: &Datastore, name: &str) -> Result<bool, StoreAdminError> {
    StoreName::parse(name)?;
    Ok(find_by_name(datastore, name).await?.is_none())
}

/// Create a store owned by the seller.
///
/// # Errors
///
/// Returns `InvalidName` or `NameTaken` on validation failure, or a
/// datastore error.
pub async fn create_store(
    datastore: &Datastore,
    seller: &Seller,
    name: &str,
    description: Option<String>,
    currency: CurrencyCode,
    settings: StoreSettings,
) -> Result<Store, StoreAdminError> {
    let name = StoreName::parse(name)?;
    if find_by_name(datastore, name.as_str()).await?.is_some() {
        return Err(StoreAdminError::NameTaken);
    }

    let store = Store {
        id: StoreId::generate(),
        owner: seller.id,
        name,
        description,
        currency,
        settings,
        created_at: Utc::now(),
    };
    datastore
        .insert(collections::STORES, store.id.as_uuid(), &store)
        .await?;
    tracing::info!(store = %store.name, "store created");
    Ok(store)
}

/// All stores owned by a seller.
///
/// # Errors
///
/// Returns a datastore error on storage failure.
pub async fn stores_for_seller(
    datastore: &Datastore,
    seller_id: SellerId,
) -> Result<Vec<Store>, StoreAdminError> {
    let mut stores: Vec<Store> = datastore
        .query(
            collections::STORES,
            &Filter::new().field("owner", seller_id.to_string()),
        )
        .await?;
    stores.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(stores)
}

/// Load a store and verify the seller owns it. Every store-scoped admin
/// operation goes through this guard; a store that exists but belongs to
/// someone else reads as not found.
///
/// # Errors
///
/// Returns `NotFound` when the store is missing or foreign-owned, or a
/// datastore error.
pub async fn owned_store(
    datastore: &Datastore,
    seller: &Seller,
    store_id: StoreId,
) -> Result<Store, StoreAdminError> {
    datastore
        .get::<Store>(collections::STORES, store_id.as_uuid())
        .await?
        .filter(|store| store.owner == seller.id)
        .ok_or(StoreAdminError::NotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shoplane_core::Email;

    use super::*;

    fn seller() -> Seller {
        Seller {
            id: SellerId::generate(),
            email: Email::parse("seller@example.com").unwrap(),
            display_name: None,
            password_hash: "unused".to_owned(),
            created_at: Utc::now(),
        }
    }

    async fn make_store(datastore: &Datastore, seller: &Seller, name: &str) -> Store {
        create_store(
            datastore,
            seller,
            name,
            None,
            CurrencyCode::default(),
            StoreSettings::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_name() {
        let datastore = Datastore::new();
        let seller = seller();
        let store = make_store(&datastore, &seller, "My-Shop").await;

        // The slug is lowercased on the way in and lookups normalize too.
        assert_eq!(store.name.as_str(), "my-shop");
        let found = find_by_name(&datastore, "MY-SHOP").await.unwrap().unwrap();
        assert_eq!(found.id, store.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let datastore = Datastore::new();
        let seller = seller();
        make_store(&datastore, &seller, "taken").await;

        let err = create_store(
            &datastore,
            &seller,
            "Taken",
            None,
            CurrencyCode::default(),
            StoreSettings::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreAdminError::NameTaken));
        assert!(!name_available(&datastore, "taken").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_name_rejected() {
        let datastore = Datastore::new();
        let err = name_available(&datastore, "has spaces").await.unwrap_err();
        assert!(matches!(err, StoreAdminError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_ownership_guard() {
        let datastore = Datastore::new();
        let owner = seller();
        let intruder = seller();
        let store = make_store(&datastore, &owner, "guarded").await;

        assert!(owned_store(&datastore, &owner, store.id).await.is_ok());
        let err = owned_store(&datastore, &intruder, store.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreAdminError::NotFound));
    }
}
