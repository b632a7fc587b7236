//! Checkout totals and promotion snapshots across both services.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shoplane_integration_tests::{TestApp, cart_line, money, shipping_address};

fn zero_fees() -> Value {
    json!({ "shipping_fee": "0", "tax_rate": "0" })
}

#[tokio::test]
async fn fixed_discount_applies_to_order_total() {
    let app = TestApp::spawn().await;
    let (token, store) = app.seller_with_store(zero_fees()).await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "250.00" }))
        .await;
    app.create_promotion(
        &token,
        store_id,
        json!({
            "code": "SAVE200",
            "discount_type": "fixed",
            "discount_value": "200",
            "conditions": { "min_purchase_amount": "500" },
        }),
    )
    .await;

    let response = app
        .post(
            &app.storefront,
            "/checkout",
            None,
            &json!({
                "store_id": store["id"],
                "items": [cart_line(&store, &product, 4)],
                "shipping": shipping_address("guest@example.com"),
                "promotion_code": "save200",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();

    assert_eq!(money(&order["subtotal"]), "1000.00".parse::<Decimal>().unwrap());
    assert_eq!(
        money(&order["discount"]["amount"]),
        "200.00".parse::<Decimal>().unwrap()
    );
    assert_eq!(money(&order["total"]), "800.00".parse::<Decimal>().unwrap());
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_method"], "cash_on_delivery");
    assert!(order["is_guest"].as_bool().unwrap());
}

#[tokio::test]
async fn discount_larger_than_subtotal_floors_total_at_zero() {
    let app = TestApp::spawn().await;
    let (token, store) = app.seller_with_store(zero_fees()).await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "100.00" }))
        .await;
    app.create_promotion(
        &token,
        store_id,
        json!({ "code": "BIG", "discount_type": "fixed", "discount_value": "200" }),
    )
    .await;

    let response = app
        .post(
            &app.storefront,
            "/checkout",
            None,
            &json!({
                "store_id": store["id"],
                "items": [cart_line(&store, &product, 1)],
                "shipping": shipping_address("guest@example.com"),
                "promotion_code": "BIG",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(money(&order["total"]), Decimal::ZERO);
}

#[tokio::test]
async fn validate_endpoint_reports_discount_and_reasons() {
    let app = TestApp::spawn().await;
    let (token, store) = app.seller_with_store(zero_fees()).await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "250.00" }))
        .await;
    app.create_promotion(
        &token,
        store_id,
        json!({
            "code": "TEN",
            "discount_type": "percentage",
            "discount_value": "10",
            "conditions": { "min_purchase_amount": "500" },
        }),
    )
    .await;

    // Above the minimum: valid with the computed amount.
    let response = app
        .post(
            &app.storefront,
            "/promotions/validate",
            None,
            &json!({
                "store_id": store["id"],
                "code": "ten",
                "items": [cart_line(&store, &product, 4)],
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["valid"].as_bool().unwrap());
    assert_eq!(money(&body["discount_amount"]), "100.00".parse::<Decimal>().unwrap());

    // Below the minimum: invalid with a human-readable reason, not an error.
    let response = app
        .post(
            &app.storefront,
            "/promotions/validate",
            None,
            &json!({
                "store_id": store["id"],
                "code": "TEN",
                "items": [cart_line(&store, &product, 1)],
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(!body["valid"].as_bool().unwrap());
    assert!(body["reason"].as_str().unwrap().contains("minimum purchase"));

    // Unknown code.
    let response = app
        .post(
            &app.storefront,
            "/promotions/validate",
            None,
            &json!({
                "store_id": store["id"],
                "code": "NOPE",
                "items": [cart_line(&store, &product, 1)],
            }),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    assert!(!body["valid"].as_bool().unwrap());
}

#[tokio::test]
async fn shipping_fee_and_tax_follow_store_settings() {
    let app = TestApp::spawn().await;
    let (token, store) = app
        .seller_with_store(json!({ "shipping_fee": "10.00", "tax_rate": "0.20" }))
        .await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "50.00" }))
        .await;

    let response = app
        .post(
            &app.storefront,
            "/checkout",
            None,
            &json!({
                "store_id": store["id"],
                "items": [cart_line(&store, &product, 1)],
                "shipping": shipping_address("guest@example.com"),
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(money(&order["shipping"]), "10.00".parse::<Decimal>().unwrap());
    assert_eq!(money(&order["tax"]), "10.00".parse::<Decimal>().unwrap());
    assert_eq!(money(&order["total"]), "70.00".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn order_snapshot_survives_promotion_edits() {
    let app = TestApp::spawn().await;
    let (token, store) = app.seller_with_store(zero_fees()).await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "100.00" }))
        .await;
    let promotion = app
        .create_promotion(
            &token,
            store_id,
            json!({ "code": "SNAP", "discount_type": "fixed", "discount_value": "30" }),
        )
        .await;

    let (buyer_token, email) = app.signup_buyer().await;
    let response = app
        .post(
            &app.storefront,
            "/checkout",
            Some(&buyer_token),
            &json!({
                "store_id": store["id"],
                "items": [cart_line(&store, &product, 1)],
                "shipping": shipping_address(&email),
                "promotion_code": "SNAP",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    // The seller rewrites and then deletes the promotion.
    let promotion_id = promotion["id"].as_str().unwrap();
    let response = app
        .client
        .patch(format!("{}/stores/{store_id}/promotions/{promotion_id}", app.admin))
        .bearer_auth(&token)
        .json(&json!({ "discount_value": "99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let response = app
        .client
        .delete(format!("{}/stores/{store_id}/promotions/{promotion_id}", app.admin))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // The stored order still shows the amounts from commit time.
    let response = app
        .get(&app.storefront, &format!("/orders/{order_id}"), Some(&buyer_token))
        .await;
    assert_eq!(response.status(), 200);
    let stored: Value = response.json().await.unwrap();
    assert_eq!(money(&stored["discount"]["amount"]), "30.00".parse::<Decimal>().unwrap());
    assert_eq!(money(&stored["total"]), "70.00".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn storefront_order_reaches_admin_and_status_flows_back() {
    let app = TestApp::spawn().await;
    let (token, store) = app.seller_with_store(zero_fees()).await;
    let store_id = store["id"].as_str().unwrap();
    let product = app
        .create_product(&token, store_id, json!({ "name": "Widget", "price": "20.00" }))
        .await;

    let (buyer_token, email) = app.signup_buyer().await;
    let response = app
        .post(
            &app.storefront,
            "/checkout",
            Some(&buyer_token),
            &json!({
                "store_id": store["id"],
                "items": [cart_line(&store, &product, 2)],
                "shipping": shipping_address(&email),
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    // Seller sees the order.
    let response = app
        .get(&app.admin, &format!("/stores/{store_id}/orders"), Some(&token))
        .await;
    let orders: Vec<Value> = response.json().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().unwrap()["id"].as_str().unwrap(), order_id);

    // Seller ships it; the buyer sees the new status.
    let response = app
        .post(
            &app.admin,
            &format!("/stores/{store_id}/orders/{order_id}/status"),
            Some(&token),
            &json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .get(&app.storefront, &format!("/orders/{order_id}"), Some(&buyer_token))
        .await;
    let stored: Value = response.json().await.unwrap();
    assert_eq!(stored["status"], "shipped");
}
