//! Seller-side order management.

use chrono::Utc;
use shoplane_backend::datastore::{Datastore, DatastoreError, Filter, collections};
use shoplane_backend::mailer::Mailer;
use shoplane_core::types::{AccountRealm, NotificationId, NotificationKind};
use shoplane_core::{Notification, Order, OrderId, OrderStatus, Store};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderAdminError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// All orders placed in the store, newest first.
///
/// # Errors
///
/// Returns a datastore error on storage failure.
pub async fn list_orders(
    datastore: &Datastore,
    store: &Store,
) -> Result<Vec<Order>, OrderAdminError> {
    let mut orders: Vec<Order> = datastore
        .query(
            collections::ORDERS,
            &Filter::new().field("store_id", store.id.to_string()),
        )
        .await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

/// Set an order's status.
///
/// Only `status` and `updated_at` change; everything else on the order is
/// an immutable snapshot. No transition table is enforced. The buyer gets
/// a best-effort notification and email about the change.
///
/// # Errors
///
/// Returns `NotFound` when the order is not in the store, or a datastore
/// error.
pub async fn update_status(
    datastore: &Datastore,
    mailer: &Mailer,
    store: &Store,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<Order, OrderAdminError> {
    let mut order: Order = datastore
        .get(collections::ORDERS, order_id.as_uuid())
        .await?
        .filter(|order: &Order| order.store_id == store.id)
        .ok_or(OrderAdminError::NotFound)?;

    order.status = status;
    order.updated_at = Utc::now();
    datastore
        .put(collections::ORDERS, order.id.as_uuid(), &order)
        .await?;
    tracing::info!(order = %order.order_number, status = %status, "order status updated");

    notify_buyer(datastore, store, &order).await;
    mailer.send_detached(
        order.buyer_email.to_string(),
        "order_status",
        json!({
            "order_number": order.order_number,
            "store_name": order.store_name,
            "status": order.status,
        }),
    );

    Ok(order)
}

/// Best-effort status notification for signed-in buyers. Guest orders have
/// no inbox; they still get the email.
async fn notify_buyer(datastore: &Datastore, store: &Store, order: &Order) {
    let Some(buyer_id) = order.buyer_id else {
        return;
    };
    let notification = Notification {
        id: NotificationId::generate(),
        recipient_realm: AccountRealm::Buyer,
        recipient_id: buyer_id.as_uuid(),
        store_id: store.id,
        kind: NotificationKind::OrderStatus,
        body: format!("Order {} is now {}", order.order_number, order.status),
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
        tracing::warn!(error = %e, order = %order.order_number, "failed to write status notification");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shoplane_core::{
        BuyerId, CurrencyCode, Email, PaymentMethod, SellerId, ShippingAddress, StoreId, StoreName,
        StoreSettings, next_order_number,
    };

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

    fn order(store: &Store, buyer_id: Option<BuyerId>) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::generate(),
            order_number: next_order_number(now),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::default(),
            buyer_id,
            buyer_email: Email::parse("buyer@example.com").unwrap(),
            is_guest: buyer_id.is_none(),
            shipping_address: ShippingAddress {
                full_name: "Ada Lovelace".to_owned(),
                email: "buyer@example.com".to_owned(),
                phone: None,
                line1: "1 Analytical Way".to_owned(),
                line2: None,
                city: "London".to_owned(),
                state: None,
                postal_code: "N1 9GU".to_owned(),
                country: "GB".to_owned(),
            },
            items: Vec::new(),
            discount: None,
            store_id: store.id,
            store_name: store.name.to_string(),
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_status_update_notifies_signed_in_buyer() {
        let datastore = Datastore::new();
        let store = store();
        let buyer_id = BuyerId::generate();
        let order = order(&store, Some(buyer_id));
        datastore
            .insert(collections::ORDERS, order.id.as_uuid(), &order)
            .await
            .unwrap();

        let updated = update_status(
            &datastore,
            &Mailer::disabled(),
            &store,
            order.id,
            OrderStatus::Shipped,
        )
        .await
        .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert!(updated.updated_at >= order.updated_at);

        let notifications: Vec<Notification> = datastore
            .query(
                collections::NOTIFICATIONS,
                &Filter::new().field("recipient_id", buyer_id.to_string()),
            )
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications.first().unwrap().kind,
            NotificationKind::OrderStatus
        );
    }

    #[tokio::test]
    async fn test_guest_order_update_skips_notification() {
        let datastore = Datastore::new();
        let store = store();
        let order = order(&store, None);
        datastore
            .insert(collections::ORDERS, order.id.as_uuid(), &order)
            .await
            .unwrap();

        update_status(
            &datastore,
            &Mailer::disabled(),
            &store,
            order.id,
            OrderStatus::Delivered,
        )
        .await
        .unwrap();

        let notifications: Vec<Notification> = datastore
            .query(collections::NOTIFICATIONS, &Filter::new())
            .await
            .unwrap();
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_store_order_invisible() {
        let datastore = Datastore::new();
        let mine = store();
        let theirs = store();
        let order = order(&theirs, None);
        datastore
            .insert(collections::ORDERS, order.id.as_uuid(), &order)
            .await
            .unwrap();

        let err = update_status(
            &datastore,
            &Mailer::disabled(),
            &mine,
            order.id,
            OrderStatus::Shipped,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OrderAdminError::NotFound));
    }
}
