//! Public store profile and catalog endpoints.

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Serialize;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_core::{CurrencyCode, Product, Store, StoreId, StoreName};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// The public shape of a store. Owner identity stays internal.
#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub id: StoreId,
    pub name: StoreName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub currency: CurrencyCode,
    pub shipping_fee: Decimal,
    pub tax_rate: Decimal,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            description: store.description,
            currency: store.currency,
            shipping_fee: store.settings.shipping_fee,
            tax_rate: store.settings.tax_rate,
        }
    }
}

/// Resolve a store by its public name slug.
pub(crate) async fn find_store_by_name(
    datastore: &Datastore,
    name: &str,
) -> std::result::Result<Option<Store>, DatastoreError> {
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

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StoreResponse>> {
    let store = find_store_by_name(state.datastore(), &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {name}")))?;
    Ok(Json(store.into()))
}

#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let store = find_store_by_name(state.datastore(), &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {name}")))?;
    let mut products: Vec<Product> = state
        .datastore()
        .query(
            collections::PRODUCTS,
            &Filter::new().field("store_id", store.id.to_string()),
        )
        .await?;
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(products))
}
