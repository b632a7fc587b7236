//! Money helpers using decimal arithmetic.
//!
//! All amounts in Shoplane are [`rust_decimal::Decimal`] values in the store's
//! currency. Amounts are rounded to two decimal places at presentation and
//! totalling boundaries; intermediate arithmetic keeps full precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a monetary amount to two decimal places.
///
/// Uses midpoint-away-from-zero rounding, matching how totals are presented
/// to buyers (0.005 rounds up to 0.01).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// ISO 4217 currency codes supported for store currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The currency symbol used for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_up() {
        let amount: Decimal = "10.005".parse().unwrap();
        assert_eq!(round_money(amount), "10.01".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_round_money_noop_on_whole() {
        let amount = Decimal::from(800);
        assert_eq!(round_money(amount), Decimal::from(800));
    }

    #[test]
    fn test_symbol() {
        assert_eq!(CurrencyCode::USD.symbol(), "$");
        assert_eq!(CurrencyCode::GBP.symbol(), "\u{a3}");
    }
}
