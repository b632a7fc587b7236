//! Product review documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BuyerId, ProductId, ReviewId, StoreId};

/// A star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns the offending value when it is not in 1..=5.
    pub fn new(value: u8) -> Result<Self, u8> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }

    /// The underlying star count.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

/// A buyer's review of a product.
///
/// At most one review exists per (buyer, product) pair; the review service
/// enforces this before writing. Reviews created through the verified path
/// always carry `verified_purchase = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub buyer_id: BuyerId,
    pub rating: Rating,
    pub comment: String,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0), Err(0));
        assert_eq!(Rating::new(6), Err(6));
    }
}
