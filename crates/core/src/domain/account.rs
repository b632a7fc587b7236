//! Buyer and seller profile documents.
//!
//! The two account realms are independent: an identity is a seller because
//! the `users` collection holds a profile for it, and a buyer because the
//! `buyers` collection does. The password hash lives on the profile
//! document; it must never be echoed in HTTP responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BuyerId, Email, SellerId};

/// A buyer (end-customer) profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: BuyerId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A seller ("user") profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
