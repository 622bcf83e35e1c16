//! Order lifecycle types
//!
//! Lifecycle: `PENDING → OPEN → {PARTIALLY_FILLED} → {FILLED | CANCELLED}`.
//! A terminal order is never mutated again; it is soft-closed, never deleted.

use crate::errors::EngineError;
use crate::ids::{AccountId, OrderId, PairId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Rest at the limit price or better
    Limit,
    /// Take whatever liquidity is available; no price bound
    Market,
    /// Inactive until the trigger price trades, then behaves as a limit order
    StopLimit,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, funds being reserved
    Pending,
    /// Live with no fills yet
    Open,
    /// Live with some quantity filled
    PartiallyFilled,
    /// Completely filled (terminal)
    Filled,
    /// Cancelled by the owner (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    /// Whether an order in this status may rest on (or stay in) the book
    pub fn is_restable(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }
}

/// A buy or sell order against a trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub owner: AccountId,
    pub pair: PairId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; None for market orders
    pub limit_price: Option<Decimal>,
    /// Trigger price; Some only for stop-limit orders
    pub trigger_price: Option<Decimal>,
    pub quantity: Decimal,
    pub filled: Decimal,
    /// Funds still locked for this order: quote units for buys, base units
    /// for sells. Drains with each fill; cancel releases the remainder.
    pub reserved: Decimal,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new pending order (funds not yet reserved)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: AccountId,
        pair: PairId,
        side: Side,
        order_type: OrderType,
        limit_price: Option<Decimal>,
        trigger_price: Option<Decimal>,
        quantity: Decimal,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            owner,
            pair,
            side,
            order_type,
            limit_price,
            trigger_price,
            quantity,
            filled: Decimal::ZERO,
            reserved: Decimal::ZERO,
            status: OrderStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Unmatched quantity
    pub fn remaining(&self) -> Decimal {
        self.quantity - self.filled
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    /// Open the order after its reservation has been taken
    pub fn mark_open(&mut self, reserved: Decimal, timestamp: i64) {
        self.reserved = reserved;
        self.status = OrderStatus::Open;
        self.updated_at = timestamp;
    }

    /// Record a fill and advance the status
    ///
    /// Rejects fills against terminal orders and fills that would push
    /// `filled` past `quantity`; the over-fill invariant is enforced here,
    /// not at the call sites.
    pub fn apply_fill(&mut self, fill_quantity: Decimal, timestamp: i64) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::invalid_state(format!(
                "order {} is terminal",
                self.order_id
            )));
        }
        if fill_quantity <= Decimal::ZERO || fill_quantity > self.remaining() {
            return Err(EngineError::invalid_state(format!(
                "fill {} exceeds remaining {} on order {}",
                fill_quantity,
                self.remaining(),
                self.order_id
            )));
        }

        self.filled += fill_quantity;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;
        Ok(())
    }

    /// Consume part of the reservation (a fill's payment leg)
    pub fn consume_reserved(&mut self, amount: Decimal) -> Result<(), EngineError> {
        if amount > self.reserved {
            return Err(EngineError::invalid_state(format!(
                "reservation underflow on order {}: take {} of {}",
                self.order_id, amount, self.reserved
            )));
        }
        self.reserved -= amount;
        Ok(())
    }

    /// Take whatever reservation is left, zeroing it
    ///
    /// Used when releasing funds on cancel or on a market buy reaching a
    /// terminal state with part of its slippage reserve unspent.
    pub fn take_remaining_reservation(&mut self) -> Decimal {
        std::mem::take(&mut self.reserved)
    }

    /// Cancel the order
    pub fn mark_cancelled(&mut self, timestamp: i64) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::invalid_state(format!(
                "order {} is terminal",
                self.order_id
            )));
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
        Ok(())
    }

    /// Whether a stop-limit order is still waiting for its trigger
    pub fn is_untriggered_stop(&self) -> bool {
        self.order_type == OrderType::StopLimit && self.trigger_price.is_some()
    }

    /// Activate a stop-limit order: it joins the book as a plain limit order
    pub fn trigger(&mut self, timestamp: i64) {
        self.trigger_price = None;
        self.updated_at = timestamp;
    }
}
