//! Crossing detection logic
//!
//! Determines when an incoming order's limit allows it to trade against a
//! resting price. Market orders carry no limit and cross everything.

use rust_decimal::Decimal;
use types::order::Side;

/// Check if an incoming order can trade at a resting order's price
pub fn crosses(taker_side: Side, taker_limit: Option<Decimal>, resting_price: Decimal) -> bool {
    match (taker_side, taker_limit) {
        (_, None) => true,
        (Side::BUY, Some(limit)) => limit >= resting_price,
        (Side::SELL, Some(limit)) => limit <= resting_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: u64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_buy_crosses_at_or_below_limit() {
        assert!(crosses(Side::BUY, Some(d(100)), d(99)));
        assert!(crosses(Side::BUY, Some(d(100)), d(100)));
        assert!(!crosses(Side::BUY, Some(d(100)), d(101)));
    }

    #[test]
    fn test_sell_crosses_at_or_above_limit() {
        assert!(crosses(Side::SELL, Some(d(100)), d(101)));
        assert!(crosses(Side::SELL, Some(d(100)), d(100)));
        assert!(!crosses(Side::SELL, Some(d(100)), d(99)));
    }

    #[test]
    fn test_market_orders_cross_any_price() {
        assert!(crosses(Side::BUY, None, d(1_000_000)));
        assert!(crosses(Side::SELL, None, d(1)));
    }
}
