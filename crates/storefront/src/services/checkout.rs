//! Checkout: the atomic order transaction.
//!
//! Placing an order re-validates the promotion, checks and decrements
//! stock, and writes the order document in one transaction. Any failure
//! aborts the whole attempt: no partial stock decrement, no usage count
//! without an order, no order without its discount snapshot.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shoplane_backend::datastore::{Datastore, DatastoreError, Transaction, collections};
use shoplane_backend::mailer::Mailer;
use shoplane_core::{
    AppliedDiscount, Buyer, CartItem, Email, Notification, NotificationKind, Order, OrderId,
    OrderItem, Product, Promotion, PromotionId, PromotionUsage, ShippingAddress, Store, StoreId,
    cart_subtotal, next_order_number, round_money,
};
use shoplane_core::types::{AccountRealm, NotificationId};
use thiserror::Error;

use super::promotions::{self, CustomerRef, PromotionError};

/// Why an order could not be placed. Messages are written for display to
/// the buyer.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("missing required shipping field: {0}")]
    MissingShippingField(&'static str),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("item quantity must be at least 1")]
    InvalidQuantity,

    #[error("cart items do not belong to this store")]
    CartStoreMismatch,

    #[error("store not found")]
    StoreNotFound,

    #[error("{name} is no longer available")]
    ProductUnavailable { name: String },

    #[error("not enough stock for {name}: only {available} left")]
    InsufficientStock { name: String, available: i64 },

    #[error(transparent)]
    Promotion(#[from] PromotionError),

    #[error("the store was busy, please try again")]
    Contention,

    #[error(transparent)]
    Datastore(DatastoreError),
}

impl From<DatastoreError> for CheckoutError {
    fn from(e: DatastoreError) -> Self {
        match e {
            DatastoreError::Contention { .. } => Self::Contention,
            other => Self::Datastore(other),
        }
    }
}

/// A checkout submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub store_id: StoreId,
    pub items: Vec<CartItem>,
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub promotion_code: Option<String>,
}

/// Place an order.
///
/// Input validation happens before any datastore access, so those failures
/// are always recoverable by correcting the submission. The promotion code
/// is resolved to an ID up front; everything read inside the transaction is
/// re-read fresh on each attempt, including the promotion's eligibility
/// state.
///
/// # Errors
///
/// Returns a [`CheckoutError`] naming the first failed check; the datastore
/// is untouched unless the whole order committed.
pub async fn place_order(
    datastore: &Datastore,
    mailer: &Mailer,
    buyer: Option<&Buyer>,
    request: &CheckoutRequest,
) -> Result<Order, CheckoutError> {
    validate(request)?;

    let store: Store = datastore
        .get(collections::STORES, request.store_id.as_uuid())
        .await
        .map_err(CheckoutError::from)?
        .ok_or(CheckoutError::StoreNotFound)?;

    let buyer_email = match buyer {
        Some(buyer) => buyer.email.clone(),
        None => {
            Email::parse(&request.shipping.email).map_err(|_| CheckoutError::InvalidEmail)?
        }
    };
    let customer = CustomerRef {
        buyer_id: buyer.map(|b| b.id),
        email: Some(&buyer_email),
    };

    let promotion_id = match &request.promotion_code {
        Some(code) => Some(
            promotions::lookup(datastore, request.store_id, code)
                .await
                .map_err(CheckoutError::from)?
                .ok_or(PromotionError::NotFound)?
                .id,
        ),
        None => None,
    };

    let is_guest = buyer.is_none();
    let order = datastore
        .run_transaction(|tx| {
            build_order(
                tx,
                &store,
                &buyer_email,
                customer,
                is_guest,
                request,
                promotion_id,
            )
        })
        .await?;

    mailer.send_detached(
        order.buyer_email.to_string(),
        "order_confirmation",
        json!({
            "order_number": order.order_number,
            "store_name": order.store_name,
            "total": order.total,
            "currency": store.currency,
        }),
    );
    notify_seller(datastore, &store, &order).await;

    Ok(order)
}

fn validate(request: &CheckoutRequest) -> Result<(), CheckoutError> {
    if request.items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if request.items.iter().any(|item| item.quantity == 0) {
        return Err(CheckoutError::InvalidQuantity);
    }
    if let Some(field) = request.shipping.missing_field() {
        return Err(CheckoutError::MissingShippingField(field));
    }
    if request
        .items
        .iter()
        .any(|item| item.store_id != request.store_id)
    {
        return Err(CheckoutError::CartStoreMismatch);
    }
    Ok(())
}

/// One transaction attempt: promotion redemption, stock decrement, order
/// write.
fn build_order(
    tx: &mut Transaction<'_>,
    store: &Store,
    buyer_email: &Email,
    customer: CustomerRef<'_>,
    is_guest: bool,
    request: &CheckoutRequest,
    promotion_id: Option<PromotionId>,
) -> Result<Order, CheckoutError> {
    let now = Utc::now();
    let order_id = OrderId::generate();
    let subtotal = round_money(cart_subtotal(&request.items));

    // Promotion state is re-read and re-validated here so concurrent
    // redemptions cannot exceed the usage caps.
    let mut discount = None;
    if let Some(promotion_id) = promotion_id {
        let mut promotion: Promotion = tx
            .get(collections::PROMOTIONS, promotion_id.as_uuid())?
            .ok_or(PromotionError::NotFound)?;
        let evaluation = promotions::evaluate(&promotion, &request.items, customer, now)?;

        discount = Some(AppliedDiscount {
            promotion_id,
            code: promotion.code.clone(),
            discount_type: promotion.discount_type,
            amount: evaluation.amount,
            free_shipping: evaluation.free_shipping,
        });

        promotion.current_uses += 1;
        promotion.usage_history.push(PromotionUsage {
            buyer_id: customer.buyer_id,
            buyer_email: buyer_email.clone(),
            order_id,
            used_at: now,
        });
        tx.put(collections::PROMOTIONS, promotion_id.as_uuid(), &promotion)?;
    }

    for item in &request.items {
        let mut product: Product = tx
            .get(collections::PRODUCTS, item.product_id.as_uuid())?
            .ok_or_else(|| CheckoutError::ProductUnavailable {
                name: item.name.clone(),
            })?;
        let quantity = i64::from(item.quantity);

        if let Some(inventory) = product.inventory {
            if inventory < quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name.clone(),
                    available: inventory.max(0),
                });
            }
            product.inventory = Some(inventory - quantity);
        }

        if let Some(key) = item.variant_key()
            && let Some(stock) = product.variant_stock.as_mut()
            && let Some(count) = stock.get_mut(&key)
        {
            if *count < quantity {
                let available = (*count).max(0);
                return Err(CheckoutError::InsufficientStock {
                    name: format!("{} ({key})", product.name),
                    available,
                });
            }
            *count -= quantity;
        }

        tx.put(collections::PRODUCTS, item.product_id.as_uuid(), &product)?;
    }

    let discount_amount = discount.as_ref().map_or(Decimal::ZERO, |d| d.amount);
    let free_shipping = discount.as_ref().is_some_and(|d| d.free_shipping);
    let taxable = (subtotal - discount_amount).max(Decimal::ZERO);
    let shipping = if free_shipping {
        Decimal::ZERO
    } else {
        store.settings.shipping_fee
    };
    let tax = round_money(taxable * store.settings.tax_rate);
    let total = round_money(taxable + shipping + tax);

    let order = Order {
        id: order_id,
        order_number: next_order_number(now),
        status: shoplane_core::OrderStatus::default(),
        payment_method: shoplane_core::PaymentMethod::default(),
        buyer_id: customer.buyer_id,
        buyer_email: buyer_email.clone(),
        is_guest,
        shipping_address: request.shipping.clone(),
        items: request.items.iter().map(OrderItem::from).collect(),
        discount,
        store_id: store.id,
        store_name: store.name.to_string(),
        subtotal,
        shipping,
        tax,
        total,
        created_at: now,
        updated_at: now,
    };
    tx.put(collections::ORDERS, order_id.as_uuid(), &order)?;
    Ok(order)
}

/// Best-effort new-order notification for the store owner. Failures are
/// logged and never surface to the buyer.
async fn notify_seller(datastore: &Datastore, store: &Store, order: &Order) {
    let notification = Notification {
        id: NotificationId::generate(),
        recipient_realm: AccountRealm::Seller,
        recipient_id: store.owner.as_uuid(),
        store_id: store.id,
        kind: NotificationKind::NewOrder,
        body: format!("New order {} placed in {}", order.order_number, store.name),
        order_id: Some(order.id),
        read: false,
        created_at: Utc::now(),
    };
    if let Err(e) = datastore
        .insert(
            collections::NOTIFICATIONS,
            notification.id.as_uuid(),
            &notification,
        )
        .await
    {
        tracing::warn!(error = %e, order = %order.order_number, "failed to write new-order notification");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use shoplane_core::{
        ApplicationType, CurrencyCode, DiscountType, ProductId, PromotionConditions, PromotionId,
        SellerId, StoreName, StoreSettings,
    };

    use super::*;

    fn money(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn store_with(settings: StoreSettings) -> Store {
        Store {
            id: StoreId::generate(),
            owner: SellerId::generate(),
            name: StoreName::parse("test-shop").unwrap(),
            description: None,
            currency: CurrencyCode::default(),
            settings,
            created_at: Utc::now(),
        }
    }

    fn product(store: &Store, price: &str, inventory: Option<i64>) -> Product {
        Product {
            id: ProductId::generate(),
            store_id: store.id,
            name: "Widget".to_owned(),
            description: None,
            price: money(price),
            image: None,
            inventory,
            variant_stock: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_item(store: &Store, product: &Product, quantity: u32) -> CartItem {
        CartItem {
            product_id: product.id,
            store_id: store.id,
            store_name: store.name.to_string(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            image: None,
            variant: None,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: None,
            line1: "1 Analytical Way".to_owned(),
            line2: None,
            city: "London".to_owned(),
            state: None,
            postal_code: "N1 9GU".to_owned(),
            country: "GB".to_owned(),
        }
    }

    async fn seed(datastore: &Datastore, store: &Store, products: &[&Product]) {
        datastore
            .insert(collections::STORES, store.id.as_uuid(), store)
            .await
            .unwrap();
        for product in products {
            datastore
                .insert(collections::PRODUCTS, product.id.as_uuid(), product)
                .await
                .unwrap();
        }
    }

    fn fixed_promotion(store: &Store, value: &str, min_purchase: Option<&str>) -> Promotion {
        Promotion {
            id: PromotionId::generate(),
            store_id: store.id,
            code: "SAVE".to_owned(),
            discount_type: DiscountType::Fixed,
            discount_value: money(value),
            application_type: ApplicationType::EntireOrder,
            applicable_product_ids: Vec::new(),
            conditions: PromotionConditions {
                min_purchase_amount: min_purchase.map(money),
                ..PromotionConditions::default()
            },
            current_uses: 0,
            usage_history: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_order_totals_with_fixed_discount() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let product = product(&store, "250.00", None);
        seed(&datastore, &store, &[&product]).await;
        let promo = fixed_promotion(&store, "200", Some("500"));
        datastore
            .insert(collections::PROMOTIONS, promo.id.as_uuid(), &promo)
            .await
            .unwrap();

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 4)],
            shipping: address(),
            promotion_code: Some("save".to_owned()),
        };
        let order = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        assert_eq!(order.subtotal, money("1000.00"));
        assert_eq!(order.discount.as_ref().unwrap().amount, money("200.00"));
        assert_eq!(order.total, money("800.00"));
        assert!(order.is_guest);

        let stored: Promotion = datastore
            .get(collections::PROMOTIONS, promo.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_uses, 1);
        assert_eq!(stored.usage_history.len(), 1);
        assert_eq!(stored.usage_history.first().unwrap().order_id, order.id);
    }

    #[tokio::test]
    async fn test_fixed_discount_larger_than_subtotal_floors_at_zero() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let product = product(&store, "100.00", None);
        seed(&datastore, &store, &[&product]).await;
        let promo = fixed_promotion(&store, "200", None);
        datastore
            .insert(collections::PROMOTIONS, promo.id.as_uuid(), &promo)
            .await
            .unwrap();

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 1)],
            shipping: address(),
            promotion_code: Some("SAVE".to_owned()),
        };
        let order = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        assert_eq!(order.total, Decimal::ZERO);
        assert_eq!(order.discount.unwrap().amount, money("100.00"));
    }

    #[tokio::test]
    async fn test_shipping_and_tax_from_store_settings() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings {
            shipping_fee: money("10.00"),
            tax_rate: money("0.20"),
        });
        let product = product(&store, "50.00", None);
        seed(&datastore, &store, &[&product]).await;

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 1)],
            shipping: address(),
            promotion_code: None,
        };
        let order = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        assert_eq!(order.shipping, money("10.00"));
        assert_eq!(order.tax, money("10.00"));
        assert_eq!(order.total, money("70.00"));
    }

    #[tokio::test]
    async fn test_free_shipping_zeroes_shipping_only() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings {
            shipping_fee: money("10.00"),
            tax_rate: Decimal::ZERO,
        });
        let product = product(&store, "50.00", None);
        seed(&datastore, &store, &[&product]).await;
        let mut promo = fixed_promotion(&store, "0", None);
        promo.discount_type = DiscountType::FreeShipping;
        datastore
            .insert(collections::PROMOTIONS, promo.id.as_uuid(), &promo)
            .await
            .unwrap();

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 1)],
            shipping: address(),
            promotion_code: Some("SAVE".to_owned()),
        };
        let order = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        assert_eq!(order.shipping, Decimal::ZERO);
        assert_eq!(order.subtotal, money("50.00"));
        assert_eq!(order.total, money("50.00"));
    }

    #[tokio::test]
    async fn test_insufficient_stock_aborts_everything() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let plentiful = product(&store, "10.00", Some(100));
        let scarce = product(&store, "10.00", Some(1));
        seed(&datastore, &store, &[&plentiful, &scarce]).await;
        let promo = fixed_promotion(&store, "5", None);
        datastore
            .insert(collections::PROMOTIONS, promo.id.as_uuid(), &promo)
            .await
            .unwrap();

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![
                cart_item(&store, &plentiful, 2),
                cart_item(&store, &scarce, 3),
            ],
            shipping: address(),
            promotion_code: Some("SAVE".to_owned()),
        };
        let err = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { available: 1, .. }));

        // Nothing committed: the first line's stock and the promotion
        // counter are untouched, and no order exists.
        let unchanged: Product = datastore
            .get(collections::PRODUCTS, plentiful.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.inventory, Some(100));
        let stored: Promotion = datastore
            .get(collections::PROMOTIONS, promo.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_uses, 0);
        let orders: Vec<Order> = datastore
            .query(collections::ORDERS, &Default::default())
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_variant_stock_checked_and_decremented() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let mut tracked = product(&store, "10.00", None);
        let mut stock = BTreeMap::new();
        stock.insert("Color: Red / Size: M".to_owned(), 2_i64);
        tracked.variant_stock = Some(stock);
        seed(&datastore, &store, &[&tracked]).await;

        let mut item = cart_item(&store, &tracked, 2);
        let mut variant = BTreeMap::new();
        variant.insert("Size".to_owned(), "M".to_owned());
        variant.insert("Color".to_owned(), "Red".to_owned());
        item.variant = Some(variant);

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![item.clone()],
            shipping: address(),
            promotion_code: None,
        };
        place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        let stored: Product = datastore
            .get(collections::PRODUCTS, tracked.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.variant_inventory("Color: Red / Size: M"), Some(0));

        // The variant is now sold out.
        let err = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { available: 0, .. }));
    }

    #[tokio::test]
    async fn test_untracked_inventory_never_blocks() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let untracked = product(&store, "10.00", None);
        seed(&datastore, &store, &[&untracked]).await;

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &untracked, 10_000)],
            shipping: address(),
            promotion_code: None,
        };
        assert!(
            place_order(&datastore, &Mailer::disabled(), None, &request)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_validation_failures_before_datastore() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let product = product(&store, "10.00", None);

        let empty = CheckoutRequest {
            store_id: store.id,
            items: Vec::new(),
            shipping: address(),
            promotion_code: None,
        };
        assert!(matches!(
            place_order(&datastore, &Mailer::disabled(), None, &empty)
                .await
                .unwrap_err(),
            CheckoutError::EmptyCart
        ));

        let mut bad_address = address();
        bad_address.country = String::new();
        let missing = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 1)],
            shipping: bad_address,
            promotion_code: None,
        };
        assert!(matches!(
            place_order(&datastore, &Mailer::disabled(), None, &missing)
                .await
                .unwrap_err(),
            CheckoutError::MissingShippingField("country")
        ));

        let mut foreign = cart_item(&store, &product, 1);
        foreign.store_id = StoreId::generate();
        let mismatched = CheckoutRequest {
            store_id: store.id,
            items: vec![foreign],
            shipping: address(),
            promotion_code: None,
        };
        assert!(matches!(
            place_order(&datastore, &Mailer::disabled(), None, &mismatched)
                .await
                .unwrap_err(),
            CheckoutError::CartStoreMismatch
        ));
    }

    #[tokio::test]
    async fn test_per_customer_cap_enforced_across_orders() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let product = product(&store, "100.00", None);
        seed(&datastore, &store, &[&product]).await;
        let mut promo = fixed_promotion(&store, "10", None);
        promo.conditions.max_uses_per_customer = Some(1);
        datastore
            .insert(collections::PROMOTIONS, promo.id.as_uuid(), &promo)
            .await
            .unwrap();

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &product, 1)],
            shipping: address(),
            promotion_code: Some("SAVE".to_owned()),
        };
        place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap();

        // Same guest email again: the cap holds.
        let err = place_order(&datastore, &Mailer::disabled(), None, &request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Promotion(PromotionError::PerCustomerLimitReached)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_last_unit_single_winner() {
        let datastore = Datastore::new();
        let store = store_with(StoreSettings::default());
        let scarce = product(&store, "10.00", Some(1));
        seed(&datastore, &store, &[&scarce]).await;

        let request = CheckoutRequest {
            store_id: store.id,
            items: vec![cart_item(&store, &scarce, 1)],
            shipping: address(),
            promotion_code: None,
        };
        let attempt = |datastore: Datastore, request: CheckoutRequest| async move {
            place_order(&datastore, &Mailer::disabled(), None, &request).await
        };
        let (a, b) = tokio::join!(
            attempt(datastore.clone(), request.clone()),
            attempt(datastore.clone(), request.clone())
        );
        assert!(a.is_ok() ^ b.is_ok(), "exactly one order must win the last unit");

        let stored: Product = datastore
            .get(collections::PRODUCTS, scarce.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.inventory, Some(0));
    }
}
