//! Test harness: both services on ephemeral ports over one shared backend.
//!
//! Orders placed through the storefront must show up for sellers in the
//! admin API and vice versa, so the harness boots the two routers against
//! the same in-memory [`Backend`], the way a deployment shares one
//! document database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shoplane_backend::Backend;
use shoplane_backend::mailer::Mailer;
use tokio::net::TcpListener;
use uuid::Uuid;

pub struct TestApp {
    pub storefront: String,
    pub admin: String,
    pub client: reqwest::Client,
    pub backend: Backend,
}

async fn serve(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

impl TestApp {
    /// Boot both services over a fresh shared backend.
    pub async fn spawn() -> Self {
        let backend = Backend::in_memory(Mailer::disabled());

        let storefront_config = shoplane_storefront::config::StorefrontConfig {
            host: std::net::Ipv4Addr::LOCALHOST.into(),
            port: 0,
            email_endpoint: None,
            email_api_key: None,
        };
        let storefront_state =
            shoplane_storefront::state::AppState::new(storefront_config, backend.clone());
        let storefront = serve(shoplane_storefront::app(storefront_state)).await;

        let admin_config = shoplane_admin::config::AdminConfig {
            host: std::net::Ipv4Addr::LOCALHOST.into(),
            port: 0,
            email_endpoint: None,
            email_api_key: None,
        };
        let admin_state = shoplane_admin::state::AppState::new(admin_config, backend.clone());
        let admin = serve(shoplane_admin::app(admin_state)).await;

        Self {
            storefront,
            admin,
            client: reqwest::Client::new(),
            backend,
        }
    }

    pub async fn post(
        &self,
        base: &str,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> reqwest::Response {
        let mut request = self.client.post(format!("{base}{path}")).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.unwrap()
    }

    pub async fn get(&self, base: &str, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{base}{path}"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.unwrap()
    }

    /// Register a seller and create a store with the given settings.
    /// Returns the seller token and the store document.
    pub async fn seller_with_store(&self, settings: Value) -> (String, Value) {
        let email = format!("seller-{}@example.com", Uuid::new_v4());
        let response = self
            .post(
                &self.admin,
                "/auth/signup",
                None,
                &json!({ "email": email, "password": "correct-horse" }),
            )
            .await;
        assert_eq!(response.status(), 201, "seller signup failed");
        let session: Value = response.json().await.unwrap();
        let token = session["token"].as_str().unwrap().to_owned();

        let name = format!("shop-{}", Uuid::new_v4().simple());
        let response = self
            .post(
                &self.admin,
                "/stores",
                Some(&token),
                &json!({ "name": name, "settings": settings }),
            )
            .await;
        assert_eq!(response.status(), 201, "store creation failed");
        let store: Value = response.json().await.unwrap();
        (token, store)
    }

    /// Create a product through the admin API and return its document.
    pub async fn create_product(&self, token: &str, store_id: &str, body: Value) -> Value {
        let response = self
            .post(
                &self.admin,
                &format!("/stores/{store_id}/products"),
                Some(token),
                &body,
            )
            .await;
        assert_eq!(response.status(), 201, "product creation failed");
        response.json().await.unwrap()
    }

    /// Create a promotion through the admin API and return its document.
    pub async fn create_promotion(&self, token: &str, store_id: &str, body: Value) -> Value {
        let response = self
            .post(
                &self.admin,
                &format!("/stores/{store_id}/promotions"),
                Some(token),
                &body,
            )
            .await;
        assert_eq!(response.status(), 201, "promotion creation failed");
        response.json().await.unwrap()
    }

    /// Register a buyer. Returns the buyer token and email.
    pub async fn signup_buyer(&self) -> (String, String) {
        let email = format!("buyer-{}@example.com", Uuid::new_v4());
        let response = self
            .post(
                &self.storefront,
                "/auth/signup",
                None,
                &json!({ "email": email, "password": "correct-horse" }),
            )
            .await;
        assert_eq!(response.status(), 201, "buyer signup failed");
        let session: Value = response.json().await.unwrap();
        (session["token"].as_str().unwrap().to_owned(), email)
    }
}

/// A cart line in the wire shape checkout expects.
#[must_use]
pub fn cart_line(store: &Value, product: &Value, quantity: u32) -> Value {
    json!({
        "product_id": product["id"],
        "store_id": store["id"],
        "store_name": store["name"],
        "name": product["name"],
        "price": product["price"],
        "quantity": quantity,
    })
}

/// A complete shipping address.
#[must_use]
pub fn shipping_address(email: &str) -> Value {
    json!({
        "full_name": "Ada Lovelace",
        "email": email,
        "line1": "1 Analytical Way",
        "city": "London",
        "postal_code": "N1 9GU",
        "country": "GB",
    })
}

/// Parse a money field that travels as a JSON string.
#[must_use]
pub fn money(value: &Value) -> Decimal {
    value.as_str().expect("money fields serialize as strings")
        .parse()
        .unwrap()
}
