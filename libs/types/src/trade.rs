//! Immutable trade records
//!
//! One `Trade` is created per match and never mutated or deleted; it is
//! the audit trail of the matching engine. The execution price is always
//! the maker's resting price.

use crate::ids::{AccountId, OrderId, PairId, TradeId};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single match between a resting (maker) and incoming (taker) order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub pair: PairId,

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    // Account references
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,

    /// Side of the incoming (taker) order
    pub taker_side: Side,
    /// Execution price: the maker's resting price
    pub price: Decimal,
    pub quantity: Decimal,

    /// Fee charged against the maker's proceeds, in the asset they received
    pub maker_fee: Decimal,
    /// Fee charged against the taker's proceeds, in the asset they received
    pub taker_fee: Decimal,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pair: PairId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_side: Side,
        price: Decimal,
        quantity: Decimal,
        maker_fee: Decimal,
        taker_fee: Decimal,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            pair,
            maker_order_id,
            taker_order_id,
            maker_account_id,
            taker_account_id,
            taker_side,
            price,
            quantity,
            maker_fee,
            taker_fee,
            executed_at,
        }
    }

    /// Trade value in quote units (price × quantity)
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
