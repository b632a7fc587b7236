//! Store documents: a seller's tenant within the platform.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, SellerId, StoreId};

/// Errors that can occur when parsing a [`StoreName`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreNameError {
    #[error("store name cannot be empty")]
    Empty,
    #[error("store name must be at most {max} characters")]
    TooLong { max: usize },
    #[error("store name may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacter,
    #[error("store name cannot start or end with a hyphen")]
    EdgeHyphen,
}

/// A store's unique public name, used for its storefront URL.
///
/// Lowercase slug form; comparison is therefore case-insensitive by
/// construction (input is lowercased before validation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StoreName(String);

impl StoreName {
    /// Maximum length of a store name.
    pub const MAX_LENGTH: usize = 40;

    /// Parse a `StoreName`, lowercasing and validating the slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, too long, contains characters
    /// outside `[a-z0-9-]`, or starts/ends with a hyphen.
    pub fn parse(s: &str) -> Result<Self, StoreNameError> {
        let s = s.trim().to_lowercase();

        if s.is_empty() {
            return Err(StoreNameError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(StoreNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(StoreNameError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(StoreNameError::EdgeHyphen);
        }

        Ok(Self(s))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreName {
    type Err = StoreNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-store checkout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Flat shipping fee added to every order (zeroed by free-shipping
    /// promotions).
    #[serde(default)]
    pub shipping_fee: Decimal,
    /// Tax rate applied to the discounted subtotal, e.g. `0.08` for 8%.
    #[serde(default)]
    pub tax_rate: Decimal,
}

/// A seller's tenant within the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub owner: SellerId,
    pub name: StoreName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub settings: StoreSettings,
    pub created_at: DateTime<Utc>,
}
