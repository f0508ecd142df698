//! Decimal money helpers.
//!
//! Prices are held as [`Decimal`] with two fractional digits. The API speaks
//! `Float`, so conversion happens only at the edge.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Number of fractional digits kept for every amount.
pub const SCALE: u32 = 2;

/// Convert an API float into a rounded decimal amount.
///
/// Returns `None` for NaN or infinite input.
#[must_use]
pub fn from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(SCALE))
}

/// Convert a decimal amount into an API float.
#[must_use]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Price of `quantity` units at `unit_price`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_from_f64_rounds_to_cents() {
        assert_eq!(from_f64(45.99).unwrap(), Decimal::from_str("45.99").unwrap());
        assert_eq!(from_f64(0.005_1).unwrap(), Decimal::from_str("0.01").unwrap());
    }

    #[test]
    fn test_from_f64_rejects_nan() {
        assert!(from_f64(f64::NAN).is_none());
        assert!(from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_line_total() {
        let price = Decimal::from_str("25.50").unwrap();
        assert_eq!(line_total(price, 3), Decimal::from_str("76.50").unwrap());
    }

    #[test]
    fn test_to_f64() {
        let price = Decimal::from_str("18.75").unwrap();
        assert!((to_f64(price) - 18.75).abs() < f64::EPSILON);
    }
}
