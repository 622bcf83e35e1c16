//! Price level with a FIFO order queue
//!
//! A price level holds every resting order at one price point, in strict
//! arrival order, which is what enforces time priority within the level.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use types::ids::{AccountId, OrderId};

/// One resting order's footprint at a price level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelEntry {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub remaining: Decimal,
}

/// All orders resting at a single price, FIFO
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<LevelEntry>,
    /// Cached sum of entry remainders, kept in sync by every mutation
    total_quantity: Decimal,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the back of the queue (time priority)
    pub fn insert(&mut self, order_id: OrderId, owner: AccountId, remaining: Decimal) {
        self.orders.push_back(LevelEntry {
            order_id,
            owner,
            remaining,
        });
        self.total_quantity += remaining;
    }

    /// Remove an order by id, returning its remaining quantity
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Decimal> {
        let position = self
            .orders
            .iter()
            .position(|entry| &entry.order_id == order_id)?;
        let entry = self.orders.remove(position)?;
        self.total_quantity -= entry.remaining;
        Some(entry.remaining)
    }

    /// First entry not owned by `taker`: the next maker in time priority,
    /// skipping over the taker's own resting orders
    pub fn first_counterparty(&self, taker: AccountId) -> Option<LevelEntry> {
        self.orders.iter().find(|entry| entry.owner != taker).copied()
    }

    /// Reduce an entry's remaining quantity after a fill, dropping it when
    /// fully consumed
    pub fn reduce(&mut self, order_id: &OrderId, quantity: Decimal) -> bool {
        let Some(position) = self
            .orders
            .iter()
            .position(|entry| &entry.order_id == order_id)
        else {
            return false;
        };

        let entry = &mut self.orders[position];
        if quantity >= entry.remaining {
            self.total_quantity -= entry.remaining;
            self.orders.remove(position);
        } else {
            entry.remaining -= quantity;
            self.total_quantity -= quantity;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
