//! Product management.
//!
//! Plain edits are read-modify-write with last-write-wins semantics, same
//! as the original platform. Restocking goes through the datastore
//! transaction instead, because it races against checkout decrements on
//! the same counters.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_core::{Product, ProductId, Store};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductAdminError {
    #[error("product not found")]
    NotFound,

    #[error("price cannot be negative")]
    InvalidPrice,

    #[error("inventory cannot go negative")]
    NegativeInventory,

    #[error("the product was busy, please try again")]
    Contention,

    #[error(transparent)]
    Datastore(DatastoreError),
}

impl From<DatastoreError> for ProductAdminError {
    fn from(e: DatastoreError) -> Self {
        match e {
            DatastoreError::Contention { .. } => Self::Contention,
            other => Self::Datastore(other),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub inventory: Option<i64>,
    #[serde(default)]
    pub variant_stock: Option<BTreeMap<String, i64>>,
}

/// Partial product update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub inventory: Option<Option<i64>>,
    #[serde(default)]
    pub variant_stock: Option<BTreeMap<String, i64>>,
}

/// Create a product in the store.
///
/// # Errors
///
/// Returns `InvalidPrice` for a negative price or a datastore error.
pub async fn create_product(
    datastore: &Datastore,
    store: &Store,
    payload: NewProduct,
) -> Result<Product, ProductAdminError> {
    if payload.price < Decimal::ZERO {
        return Err(ProductAdminError::InvalidPrice);
    }
    if payload.inventory.is_some_and(|n| n < 0)
        || payload
            .variant_stock
            .as_ref()
            .is_some_and(|stock| stock.values().any(|n| *n < 0))
    {
        return Err(ProductAdminError::NegativeInventory);
    }

    let now = Utc::now();
    let product = Product {
        id: ProductId::generate(),
        store_id: store.id,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        image: payload.image,
        inventory: payload.inventory,
        variant_stock: payload.variant_stock,
        created_at: now,
        updated_at: now,
    };
    datastore
        .insert(collections::PRODUCTS, product.id.as_uuid(), &product)
        .await?;
    Ok(product)
}

/// Apply a partial update. Last write wins.
///
/// # Errors
///
/// Returns `NotFound` when the product is not in the store, `InvalidPrice`
/// for a negative price, or a datastore error.
pub async fn update_product(
    datastore: &Datastore,
    store: &Store,
    product_id: ProductId,
    payload: ProductUpdate,
) -> Result<Product, ProductAdminError> {
    if payload.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ProductAdminError::InvalidPrice);
    }

    let mut product = load_in_store(datastore, store, product_id).await?;
    if let Some(name) = payload.name {
        product.name = name;
    }
    if let Some(description) = payload.description {
        product.description = Some(description);
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    if let Some(image) = payload.image {
        product.image = Some(image);
    }
    if let Some(inventory) = payload.inventory {
        if inventory.is_some_and(|n| n < 0) {
            return Err(ProductAdminError::NegativeInventory);
        }
        product.inventory = inventory;
    }
    if let Some(variant_stock) = payload.variant_stock {
        if variant_stock.values().any(|n| *n < 0) {
            return Err(ProductAdminError::NegativeInventory);
        }
        product.variant_stock = Some(variant_stock);
    }
    product.updated_at = Utc::now();

    datastore
        .put(collections::PRODUCTS, product.id.as_uuid(), &product)
        .await?;
    Ok(product)
}

/// Adjust stock by a signed delta, transactionally.
///
/// With a `variant` key the variant counter moves; otherwise the top-level
/// inventory does. Competing checkout decrements are serialized by the
/// transaction, and an adjustment that would take the counter below zero
/// is rejected.
///
/// # Errors
///
/// Returns `NotFound` for a missing product or untracked counter,
/// `NegativeInventory` when the delta underflows, `Contention` when
/// retries are exhausted, or a datastore error.
pub async fn adjust_stock(
    datastore: &Datastore,
    store: &Store,
    product_id: ProductId,
    delta: i64,
    variant: Option<&str>,
) -> Result<Product, ProductAdminError> {
    let store_id = store.id;
    datastore
        .run_transaction(move |tx| {
            let mut product: Product = tx
                .get(collections::PRODUCTS, product_id.as_uuid())?
                .filter(|p: &Product| p.store_id == store_id)
                .ok_or(ProductAdminError::NotFound)?;

            let counter = match variant {
                Some(key) => product
                    .variant_stock
                    .as_mut()
                    .and_then(|stock| stock.get_mut(key))
                    .ok_or(ProductAdminError::NotFound)?,
                None => product
                    .inventory
                    .as_mut()
                    .ok_or(ProductAdminError::NotFound)?,
            };
            let adjusted = counter
                .checked_add(delta)
                .ok_or(ProductAdminError::NegativeInventory)?;
            if adjusted < 0 {
                return Err(ProductAdminError::NegativeInventory);
            }
            *counter = adjusted;
            product.updated_at = Utc::now();

            tx.put(collections::PRODUCTS, product_id.as_uuid(), &product)?;
            Ok(product)
        })
        .await
}

/// Delete a product.
///
/// # Errors
///
/// Returns `NotFound` when the product is not in the store, or a datastore
/// error.
pub async fn delete_product(
    datastore: &Datastore,
    store: &Store,
    product_id: ProductId,
) -> Result<(), ProductAdminError> {
    load_in_store(datastore, store, product_id).await?;
    datastore
        .delete(collections::PRODUCTS, product_id.as_uuid())
        .await?;
    Ok(())
}

/// All products in the store, newest first.
///
/// # Errors
///
/// Returns a datastore error on storage failure.
pub async fn list_products(
    datastore: &Datastore,
    store: &Store,
) -> Result<Vec<Product>, ProductAdminError> {
    let mut products: Vec<Product> = datastore
        .query(
            collections::PRODUCTS,
            &Filter::new().field("store_id", store.id.to_string()),
        )
        .await?;
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(products)
}

async fn load_in_store(
    datastore: &Datastore,
    store: &Store,
    product_id: ProductId,
) -> Result<Product, ProductAdminError> {
    datastore
        .get::<Product>(collections::PRODUCTS, product_id.as_uuid())
        .await?
        .filter(|product| product.store_id == store.id)
        .ok_or(ProductAdminError::NotFound)
}
