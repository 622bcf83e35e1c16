//! Ask (sell-side) order book
//!
//! Maintains resting sell orders keyed by price. The best ask is the lowest
//! price, so `BTreeMap`'s natural ascending order is already priority order.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};

use super::price_level::PriceLevel;

/// Sell side of a pair's order book
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Decimal, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resting order at its limit price
    pub fn insert(&mut self, price: Decimal, order_id: OrderId, owner: AccountId, remaining: Decimal) {
        self.levels
            .entry(price)
            .or_default()
            .insert(order_id, owner, remaining);
    }

    /// Remove an order; returns true if it was found
    pub fn remove(&mut self, order_id: &OrderId, price: Decimal) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Best (lowest) ask price
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.keys().next().copied()
    }

    /// Ask prices a buy taker with `limit` can cross, best first
    ///
    /// `None` (a market buy) crosses everything.
    pub fn crossing_prices(&self, limit: Option<Decimal>) -> Vec<Decimal> {
        self.levels
            .keys()
            .copied()
            .take_while(|price| limit.map_or(true, |l| *price <= l))
            .collect()
    }

    pub fn level_mut(&mut self, price: Decimal) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Drop the level at `price` if it has no orders left
    pub fn prune_empty(&mut self, price: Decimal) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Top `depth` levels as (price, total quantity), best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Decimal, Decimal)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: u64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_best_price_is_lowest() {
        let mut book = AskBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(98), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(99), OrderId::new(), owner, Decimal::ONE);

        assert_eq!(book.best_price(), Some(d(98)));
    }

    #[test]
    fn test_crossing_prices_ascending_cut_at_limit() {
        let mut book = AskBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(99), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(101), OrderId::new(), owner, Decimal::ONE);

        // Buy limited at 100 can lift 99 and 100, not 101
        assert_eq!(book.crossing_prices(Some(d(100))), vec![d(99), d(100)]);
        // Market buy crosses everything, best first
        assert_eq!(book.crossing_prices(None), vec![d(99), d(100), d(101)]);
    }

    #[test]
    fn test_depth_snapshot_best_first() {
        let mut book = AskBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, d(2));
        book.insert(d(99), OrderId::new(), owner, d(3));
        book.insert(d(101), OrderId::new(), owner, d(4));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth, vec![(d(99), d(3)), (d(100), d(2))]);
    }
}
