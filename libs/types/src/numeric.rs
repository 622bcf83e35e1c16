//! Decimal rounding helpers
//!
//! All price/quantity/fee arithmetic uses `rust_decimal::Decimal` for
//! deterministic fixed-point behavior. Fees round half-up to the receiving
//! asset's display precision, applied once per fill so the ledger and the
//! sum of fills stay auditable.

use rust_decimal::{Decimal, RoundingStrategy};

/// Default display precision for assets without an explicit configuration.
pub const DEFAULT_DISPLAY_PRECISION: u32 = 8;

/// Round half-up (midpoint away from zero) to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate toward zero to `dp` decimal places.
///
/// Used when sizing a fill down to what a reservation affords: rounding up
/// here could spend funds that were never locked.
pub fn round_down(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Strictly positive check used by input validation.
pub fn is_positive(value: Decimal) -> bool {
    value > Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up_midpoint() {
        let v = Decimal::from_str_exact("1.005").unwrap();
        assert_eq!(round_half_up(v, 2), Decimal::from_str_exact("1.01").unwrap());
    }

    #[test]
    fn test_round_half_up_below_midpoint() {
        let v = Decimal::from_str_exact("1.0049").unwrap();
        assert_eq!(round_half_up(v, 2), Decimal::from_str_exact("1.00").unwrap());
    }

    #[test]
    fn test_round_down_truncates() {
        let v = Decimal::from_str_exact("0.129").unwrap();
        assert_eq!(round_down(v, 2), Decimal::from_str_exact("0.12").unwrap());
    }

    #[test]
    fn test_is_positive() {
        assert!(is_positive(Decimal::ONE));
        assert!(!is_positive(Decimal::ZERO));
        assert!(!is_positive(Decimal::NEGATIVE_ONE));
    }
}
