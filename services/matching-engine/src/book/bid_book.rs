//! Bid (buy-side) order book
//!
//! Maintains resting buy orders keyed by price. The best bid is the highest
//! price; `BTreeMap` gives deterministic iteration, with `next_back` for the
//! top of book.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};

use super::price_level::PriceLevel;

/// Buy side of a pair's order book
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Decimal, PriceLevel>,
}

impl BidBook {
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

    /// Best (highest) bid price
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.keys().next_back().copied()
    }

    /// Bid prices a sell taker with `limit` can cross, best first
    ///
    /// `None` (a market sell) crosses everything.
    pub fn crossing_prices(&self, limit: Option<Decimal>) -> Vec<Decimal> {
        self.levels
            .keys()
            .rev()
            .copied()
            .take_while(|price| limit.map_or(true, |l| *price >= l))
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
            .rev()
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
    fn test_best_price_is_highest() {
        let mut book = BidBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(102), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(101), OrderId::new(), owner, Decimal::ONE);

        assert_eq!(book.best_price(), Some(d(102)));
    }

    #[test]
    fn test_crossing_prices_descending_cut_at_limit() {
        let mut book = BidBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(101), OrderId::new(), owner, Decimal::ONE);
        book.insert(d(99), OrderId::new(), owner, Decimal::ONE);

        // Sell limited at 100 can hit 101 and 100, not 99
        assert_eq!(book.crossing_prices(Some(d(100))), vec![d(101), d(100)]);
        // Market sell crosses everything, best first
        assert_eq!(book.crossing_prices(None), vec![d(101), d(100), d(99)]);
    }

    #[test]
    fn test_remove_prunes_empty_level() {
        let mut book = BidBook::new();
        let owner = AccountId::new();
        let order = OrderId::new();
        book.insert(d(100), order, owner, Decimal::ONE);

        assert!(book.remove(&order, d(100)));
        assert!(book.is_empty());
        assert!(!book.remove(&order, d(100)));
    }

    #[test]
    fn test_depth_snapshot_best_first() {
        let mut book = BidBook::new();
        let owner = AccountId::new();
        book.insert(d(100), OrderId::new(), owner, d(2));
        book.insert(d(101), OrderId::new(), owner, d(3));
        book.insert(d(99), OrderId::new(), owner, d(4));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth, vec![(d(101), d(3)), (d(100), d(2))]);
    }
}
