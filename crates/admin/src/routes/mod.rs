//! Admin HTTP surface. Everything below `/stores` is scoped to stores the
//! authenticated seller owns.
//!
//! | Method | Path                                           | Handler              |
//! |--------|------------------------------------------------|----------------------|
//! | POST   | /auth/signup                                   | seller registration  |
//! | POST   | /auth/signin                                   | seller sign-in       |
//! | POST   | /auth/signout                                  | session invalidation |
//! | GET    | /stores                                        | seller's stores      |
//! | POST   | /stores                                        | create a store       |
//! | GET    | /stores/check-name                             | name availability    |
//! | GET    | /stores/{store_id}/products                    | list products        |
//! | POST   | /stores/{store_id}/products                    | create a product     |
//! | PATCH  | /stores/{store_id}/products/{id}               | update a product     |
//! | DELETE | /stores/{store_id}/products/{id}               | delete a product     |
//! | POST   | /stores/{store_id}/products/{id}/stock         | adjust stock         |
//! | GET    | /stores/{store_id}/promotions                  | list promotions      |
//! | POST   | /stores/{store_id}/promotions                  | create a promotion   |
//! | PATCH  | /stores/{store_id}/promotions/{id}             | update a promotion   |
//! | DELETE | /stores/{store_id}/promotions/{id}             | delete a promotion   |
//! | POST   | /stores/{store_id}/promotions/{id}/active      | toggle redemption    |
//! | GET    | /stores/{store_id}/orders                      | list orders          |
//! | POST   | /stores/{store_id}/orders/{id}/status          | update order status  |
//! | GET    | /stores/{store_id}/messages                    | store conversations  |
//! | POST   | /stores/{store_id}/messages                    | reply to a buyer     |
//! | GET    | /notifications                                 | seller inbox         |
//! | POST   | /notifications/{id}/read                       | mark one read        |

pub mod auth;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod stores;

use axum::Router;
use axum::routing::{get, patch, post};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/stores", get(stores::list).post(stores::create))
        .route("/stores/check-name", get(stores::check_name))
        .route(
            "/stores/{store_id}/products",
            get(products::list).post(products::create),
        )
        .route(
            "/stores/{store_id}/products/{id}",
            patch(products::update).delete(products::remove),
        )
        .route(
            "/stores/{store_id}/products/{id}/stock",
            post(products::adjust_stock),
        )
        .route(
            "/stores/{store_id}/promotions",
            get(promotions::list).post(promotions::create),
        )
        .route(
            "/stores/{store_id}/promotions/{id}",
            patch(promotions::update).delete(promotions::remove),
        )
        .route(
            "/stores/{store_id}/promotions/{id}/active",
            post(promotions::set_active),
        )
        .route("/stores/{store_id}/orders", get(orders::list))
        .route(
            "/stores/{store_id}/orders/{id}/status",
            post(orders::update_status),
        )
        .route(
            "/stores/{store_id}/messages",
            get(messages::list).post(messages::send),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", post(notifications::mark_read))
}
