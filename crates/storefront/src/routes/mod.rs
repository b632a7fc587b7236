//! Storefront HTTP surface.
//!
//! | Method | Path                                | Handler                 |
//! |--------|-------------------------------------|-------------------------|
//! | POST   | /auth/signup                        | buyer registration      |
//! | POST   | /auth/signin                        | buyer sign-in           |
//! | POST   | /auth/signout                       | session invalidation    |
//! | GET    | /stores/{name}                      | public store profile    |
//! | GET    | /stores/{name}/products             | public product catalog  |
//! | POST   | /promotions/validate                | advisory code check     |
//! | POST   | /checkout                           | atomic order placement  |
//! | GET    | /orders                             | buyer's order history   |
//! | GET    | /orders/{id}                        | single order            |
//! | GET    | /products/{id}/reviews              | product reviews         |
//! | POST   | /products/{id}/reviews              | write a review          |
//! | GET    | /products/{id}/reviews/eligibility  | advisory review check   |
//! | GET    | /messages                           | conversation history    |
//! | POST   | /messages                           | send a message          |

pub mod auth;
pub mod checkout;
pub mod messages;
pub mod orders;
pub mod promotions;
pub mod reviews;
pub mod stores;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/stores/{name}", get(stores::show))
        .route("/stores/{name}/products", get(stores::products))
        .route("/promotions/validate", post(promotions::validate))
        .route("/checkout", post(checkout::place))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route(
            "/products/{id}/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route("/products/{id}/reviews/eligibility", get(reviews::eligibility))
        .route("/messages", get(messages::list).post(messages::send))
}
