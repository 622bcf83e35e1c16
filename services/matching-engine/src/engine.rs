//! Matching engine core
//!
//! One mutex-guarded state per trading pair serializes matching for that
//! pair; unrelated pairs proceed fully in parallel. Every fill settles both
//! ledger legs inside the same critical section that updates the book, so
//! no reader observes a half-applied match.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use ledger::{FillTransfer, Ledger};
use market::{MarketConfig, PriceOracle};
use types::errors::EngineError;
use types::ids::{AccountId, OrderId, PairId, Symbol};
use types::numeric::{is_positive, round_down, round_half_up};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::trade::Trade;

use crate::book::{AskBook, BidBook};
use crate::matching::{crossing, fees};
use crate::validate::{self, OrderRequest};

/// Multiplier over the oracle price when reserving quote funds for a
/// market buy; the true fill price is unknown at lock time.
fn slippage_multiplier() -> Decimal {
    Decimal::new(105, 2) // 1.05
}

/// Result of placing an order
#[derive(Debug, Clone)]
pub struct PlaceOutcome {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// Fills produced by the immediate matching pass
    pub trades: Vec<Trade>,
}

/// Depth snapshot of one pair's book, best levels first
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub pair: PairId,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// Everything the engine tracks for one trading pair.
///
/// Mutated only under the pair's mutex.
#[derive(Default)]
struct PairState {
    bids: BidBook,
    asks: AskBook,
    /// Resting market orders, FIFO; matched ahead of priced levels
    market_bids: VecDeque<OrderId>,
    market_asks: VecDeque<OrderId>,
    /// Stop-limit orders waiting for their trigger
    stop_bids: Vec<OrderId>,
    stop_asks: Vec<OrderId>,
    /// Every order placed on this pair; terminal orders are soft-closed
    orders: HashMap<OrderId, Order>,
    /// Append-only fill history
    trades: Vec<Trade>,
    last_price: Option<Decimal>,
}

/// Order matching engine over per-pair books
pub struct MatchingEngine {
    ledger: Arc<Ledger>,
    config: Arc<MarketConfig>,
    oracle: Arc<dyn PriceOracle>,
    pairs: DashMap<PairId, Arc<Mutex<PairState>>>,
    /// Which pair an order lives on, for cancels and lookups
    order_pairs: DashMap<OrderId, PairId>,
}

impl MatchingEngine {
    pub fn new(ledger: Arc<Ledger>, config: Arc<MarketConfig>, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            ledger,
            config,
            oracle,
            pairs: DashMap::new(),
            order_pairs: DashMap::new(),
        }
    }

    /// Place an order: validate, reserve funds, match, rest the remainder.
    ///
    /// Market orders with remainder and no liquidity are left open rather
    /// than auto-cancelled; callers wanting immediate-or-cancel semantics
    /// cancel explicitly.
    pub fn place_order(&self, request: OrderRequest, now: i64) -> Result<PlaceOutcome, EngineError> {
        validate::validate(&request)?;

        let (reserve_asset, reserve_amount) = self.reservation_for(&request)?;
        self.ledger.lock(request.owner, &reserve_asset, reserve_amount)?;

        let mut order = Order::new(
            request.owner,
            request.pair.clone(),
            request.side,
            request.order_type,
            request.limit_price,
            request.trigger_price,
            request.quantity,
            now,
        );
        order.mark_open(reserve_amount, now);
        let order_id = order.order_id;

        let pair = request.pair.clone();
        let state_handle = self.pair_state(&pair);
        let mut state = state_handle.lock().unwrap();

        self.order_pairs.insert(order_id, pair.clone());
        state.orders.insert(order_id, order);

        let trades = if request.order_type == OrderType::StopLimit {
            // Stops wait off-book for their trigger; no matching pass
            match request.side {
                Side::BUY => state.stop_bids.push(order_id),
                Side::SELL => state.stop_asks.push(order_id),
            }
            Vec::new()
        } else {
            let trades = self.run_match(&mut state, &pair, order_id, now);
            self.rest_or_finalize(&mut state, &pair, order_id);
            trades
        };

        self.activate_stops(&mut state, now);

        let status = state.orders[&order_id].status;
        info!(
            %order_id, %pair, side = ?request.side, order_type = ?request.order_type,
            fills = trades.len(), ?status, "order placed"
        );
        Ok(PlaceOutcome {
            order_id,
            status,
            trades,
        })
    }

    /// Cancel an order, releasing exactly the unfilled remainder's
    /// reservation.
    pub fn cancel_order(&self, order_id: OrderId, owner: AccountId, now: i64) -> Result<Order, EngineError> {
        let pair = self
            .order_pairs
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::not_found(format!("order {order_id}")))?;

        let state_handle = self.pair_state(&pair);
        let mut state = state_handle.lock().unwrap();

        let order = state
            .orders
            .get(&order_id)
            .ok_or_else(|| EngineError::not_found(format!("order {order_id}")))?
            .clone();
        if order.owner != owner {
            // Someone else's order looks like no order at all
            return Err(EngineError::not_found(format!("order {order_id}")));
        }
        if order.status.is_terminal() {
            return Err(EngineError::invalid_state(format!(
                "order {order_id} is already {:?}",
                order.status
            )));
        }

        if order.is_untriggered_stop() {
            state.stop_bids.retain(|id| *id != order_id);
            state.stop_asks.retain(|id| *id != order_id);
        } else if order.order_type == OrderType::Market {
            state.market_bids.retain(|id| *id != order_id);
            state.market_asks.retain(|id| *id != order_id);
        } else if let Some(price) = order.limit_price {
            match order.side {
                Side::BUY => state.bids.remove(&order_id, price),
                Side::SELL => state.asks.remove(&order_id, price),
            };
        }

        let refund = order.reserved;
        if is_positive(refund) {
            let asset = self.reserve_asset(&pair, order.side);
            self.ledger.unlock(owner, &asset, refund)?;
        }

        let order = state.orders.get_mut(&order_id).unwrap();
        order.take_remaining_reservation();
        order.mark_cancelled(now)?;
        info!(%order_id, %pair, %refund, "order cancelled");
        Ok(order.clone())
    }

    /// Look up a single order
    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        let pair = self.order_pairs.get(&order_id)?.value().clone();
        let state_handle = self.pair_state(&pair);
        let state = state_handle.lock().unwrap();
        state.orders.get(&order_id).cloned()
    }

    /// All orders for one account: active first, newest first
    pub fn orders_for(&self, owner: AccountId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .pairs
            .iter()
            .flat_map(|entry| {
                let state = entry.value().lock().unwrap();
                state
                    .orders
                    .values()
                    .filter(|order| order.owner == owner)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        orders.sort_by_key(|order| (order.status.is_terminal(), std::cmp::Reverse(order.created_at)));
        orders
    }

    /// Most recent trades for a pair, newest first
    pub fn trades_for(&self, pair: &PairId, limit: usize) -> Vec<Trade> {
        let state_handle = self.pair_state(pair);
        let state = state_handle.lock().unwrap();
        state.trades.iter().rev().take(limit).cloned().collect()
    }

    /// Depth snapshot of a pair's book
    pub fn book_depth(&self, pair: &PairId, depth: usize) -> BookSnapshot {
        let state_handle = self.pair_state(pair);
        let state = state_handle.lock().unwrap();
        BookSnapshot {
            pair: pair.clone(),
            bids: state.bids.depth_snapshot(depth),
            asks: state.asks.depth_snapshot(depth),
        }
    }

    /// Last execution price on a pair, if any trade has happened
    pub fn last_price(&self, pair: &PairId) -> Option<Decimal> {
        let state_handle = self.pair_state(pair);
        let state = state_handle.lock().unwrap();
        state.last_price
    }

    fn pair_state(&self, pair: &PairId) -> Arc<Mutex<PairState>> {
        self.pairs
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(Mutex::new(PairState::default())))
            .clone()
    }

    fn reserve_asset(&self, pair: &PairId, side: Side) -> Symbol {
        match side {
            Side::BUY => pair.quote(),
            Side::SELL => pair.base(),
        }
    }

    /// What to lock before the order exists: quote notional for buys
    /// (oracle estimate plus slippage buffer for market buys), the base
    /// quantity itself for sells.
    fn reservation_for(&self, request: &OrderRequest) -> Result<(Symbol, Decimal), EngineError> {
        match request.side {
            Side::SELL => Ok((request.pair.base(), request.quantity)),
            Side::BUY => {
                let quote = request.pair.quote();
                let amount = match request.limit_price {
                    Some(limit) => limit * request.quantity,
                    None => {
                        let base = request.pair.base();
                        let price = self.oracle.price(&base).ok_or_else(|| {
                            EngineError::MarketUnavailable {
                                symbol: base.to_string(),
                            }
                        })?;
                        let quote_dp = self.config.asset(&quote).display_precision;
                        round_half_up(price * slippage_multiplier() * request.quantity, quote_dp)
                    }
                };
                Ok((quote, amount))
            }
        }
    }

    /// The matching pass: resting market orders first, then priced levels
    /// in price-time priority.
    fn run_match(&self, state: &mut PairState, pair: &PairId, taker_id: OrderId, now: i64) -> Vec<Trade> {
        let (taker_side, taker_owner, taker_limit) = {
            let taker = &state.orders[&taker_id];
            (taker.side, taker.owner, taker.limit_price)
        };
        let mut trades = Vec::new();

        // A resting market order has no posted price; the incoming order's
        // limit is the only price available, so two unpriced orders never
        // match each other.
        if let Some(exec_price) = taker_limit {
            self.match_market_queue(
                state,
                pair,
                taker_id,
                taker_side,
                taker_owner,
                exec_price,
                now,
                &mut trades,
            );
        }

        let base_dp = self.config.asset(&pair.base()).display_precision;
        let prices = match taker_side {
            Side::BUY => state.asks.crossing_prices(taker_limit),
            Side::SELL => state.bids.crossing_prices(taker_limit),
        };

        'pass: for price in prices {
            debug_assert!(crossing::crosses(taker_side, taker_limit, price));
            loop {
                if !is_positive(state.orders[&taker_id].remaining()) {
                    break 'pass;
                }

                let maker = {
                    let level = match taker_side {
                        Side::BUY => state.asks.level_mut(price),
                        Side::SELL => state.bids.level_mut(price),
                    };
                    match level {
                        Some(level) => level.first_counterparty(taker_owner),
                        None => None,
                    }
                };
                let Some(maker) = maker else {
                    break; // level exhausted (or only own orders), next price
                };

                let taker_remaining = state.orders[&taker_id].remaining();
                let mut quantity = taker_remaining.min(maker.remaining);
                if taker_side == Side::BUY && taker_limit.is_none() {
                    // Market buy: the slippage reserve bounds what it can pay
                    let afford = round_down(state.orders[&taker_id].reserved / price, base_dp);
                    quantity = quantity.min(afford);
                    if !is_positive(quantity) {
                        warn!(%taker_id, %price, "market buy reserve exhausted; remainder left open");
                        break 'pass;
                    }
                }

                match self.execute_fill(state, pair, taker_id, maker.order_id, price, quantity, now) {
                    Ok(trade) => {
                        match taker_side {
                            Side::BUY => {
                                if let Some(level) = state.asks.level_mut(price) {
                                    level.reduce(&maker.order_id, quantity);
                                }
                                state.asks.prune_empty(price);
                            }
                            Side::SELL => {
                                if let Some(level) = state.bids.level_mut(price) {
                                    level.reduce(&maker.order_id, quantity);
                                }
                                state.bids.prune_empty(price);
                            }
                        }
                        trades.push(trade);
                    }
                    Err(err) => {
                        // A settle failure means a counterparty account froze
                        // mid-pass; stop matching and leave the remainder resting.
                        warn!(%taker_id, %err, "fill failed; matching pass stopped");
                        break 'pass;
                    }
                }
            }
        }

        trades
    }

    /// Match the incoming priced order against resting market orders on the
    /// opposite side, FIFO, at the incoming order's limit price.
    #[allow(clippy::too_many_arguments)]
    fn match_market_queue(
        &self,
        state: &mut PairState,
        pair: &PairId,
        taker_id: OrderId,
        taker_side: Side,
        taker_owner: AccountId,
        exec_price: Decimal,
        now: i64,
        trades: &mut Vec<Trade>,
    ) {
        let base_dp = self.config.asset(&pair.base()).display_precision;
        let mut index = 0;
        loop {
            if !is_positive(state.orders[&taker_id].remaining()) {
                break;
            }
            let queue = match taker_side {
                Side::BUY => &state.market_asks,
                Side::SELL => &state.market_bids,
            };
            let Some(&maker_id) = queue.get(index) else {
                break;
            };

            let maker = state.orders[&maker_id].clone();
            if maker.owner == taker_owner {
                index += 1;
                continue;
            }

            let mut quantity = state.orders[&taker_id].remaining().min(maker.remaining());
            if taker_side == Side::SELL {
                // The resting market buy pays from its slippage reserve
                let afford = round_down(maker.reserved / exec_price, base_dp);
                quantity = quantity.min(afford);
                if !is_positive(quantity) {
                    index += 1;
                    continue;
                }
            }

            match self.execute_fill(state, pair, taker_id, maker_id, exec_price, quantity, now) {
                Ok(trade) => {
                    trades.push(trade);
                    let maker_filled = state.orders[&maker_id].status == OrderStatus::Filled;
                    let queue = match taker_side {
                        Side::BUY => &mut state.market_asks,
                        Side::SELL => &mut state.market_bids,
                    };
                    if maker_filled {
                        queue.remove(index);
                    } else if taker_side == Side::SELL {
                        // Couldn't afford its full remainder at this price
                        index += 1;
                    }
                }
                Err(err) => {
                    warn!(%taker_id, %err, "fill failed; matching pass stopped");
                    break;
                }
            }
        }
    }

    /// Execute one fill: ledger legs first (they can fail), then the
    /// order-state mutations (they cannot, by construction).
    #[allow(clippy::too_many_arguments)]
    fn execute_fill(
        &self,
        state: &mut PairState,
        pair: &PairId,
        taker_id: OrderId,
        maker_id: OrderId,
        price: Decimal,
        quantity: Decimal,
        now: i64,
    ) -> Result<Trade, EngineError> {
        let taker = state.orders[&taker_id].clone();
        let maker = state.orders[&maker_id].clone();
        let (buyer, seller) = match taker.side {
            Side::BUY => (&taker, &maker),
            Side::SELL => (&maker, &taker),
        };

        let base = pair.base();
        let quote = pair.quote();
        let base_dp = self.config.asset(&base).display_precision;
        let quote_dp = self.config.asset(&quote).display_precision;
        let fill_fees = fees::fill_fees(self.config.fees(pair), taker.side, price, quantity, base_dp, quote_dp);
        let notional = price * quantity;

        self.ledger.settle_fill(&FillTransfer {
            buyer: buyer.owner,
            seller: seller.owner,
            base: base.clone(),
            quote: quote.clone(),
            quote_gross: notional,
            quote_fee: fill_fees.quote_fee,
            base_gross: quantity,
            base_fee: fill_fees.base_fee,
        })?;

        // The buyer reserved at their limit but executed at the maker's
        // (equal or better) price: release the improvement immediately so
        // the remaining reservation stays remaining × limit.
        let mut buyer_cost = notional;
        if let Some(limit) = buyer.limit_price {
            let surplus = (limit - price) * quantity;
            if is_positive(surplus) {
                match self.ledger.unlock(buyer.owner, &quote, surplus) {
                    Ok(()) => buyer_cost += surplus,
                    Err(err) => warn!(buyer = %buyer.owner, %err, "surplus release failed"),
                }
            }
        }
        let (taker_cost, maker_cost) = match taker.side {
            Side::BUY => (buyer_cost, quantity),
            Side::SELL => (quantity, buyer_cost),
        };

        {
            let taker = state.orders.get_mut(&taker_id).unwrap();
            taker.apply_fill(quantity, now)?;
            taker.consume_reserved(taker_cost)?;
        }
        {
            let maker = state.orders.get_mut(&maker_id).unwrap();
            maker.apply_fill(quantity, now)?;
            maker.consume_reserved(maker_cost)?;
        }

        let trade = Trade::new(
            pair.clone(),
            maker_id,
            taker_id,
            maker.owner,
            taker.owner,
            taker.side,
            price,
            quantity,
            fill_fees.maker_fee,
            fill_fees.taker_fee,
            now,
        );
        state.last_price = Some(price);
        state.trades.push(trade.clone());
        debug!(
            %pair, maker = %maker_id, taker = %taker_id, %price, %quantity,
            "fill executed"
        );
        Ok(trade)
    }

    /// Rest the taker's remainder after the pass, or release any leftover
    /// reservation if it completed.
    fn rest_or_finalize(&self, state: &mut PairState, pair: &PairId, order_id: OrderId) {
        let order = state.orders[&order_id].clone();
        if order.status.is_restable() && is_positive(order.remaining()) {
            match (order.order_type, order.limit_price) {
                (OrderType::Market, _) => match order.side {
                    Side::BUY => state.market_bids.push_back(order_id),
                    Side::SELL => state.market_asks.push_back(order_id),
                },
                (_, Some(price)) => match order.side {
                    Side::BUY => state.bids.insert(price, order_id, order.owner, order.remaining()),
                    Side::SELL => state.asks.insert(price, order_id, order.owner, order.remaining()),
                },
                (_, None) => {}
            }
        } else if order.status == OrderStatus::Filled && is_positive(order.reserved) {
            // A filled market buy may not have spent its whole slippage
            // reserve; give the rest back.
            let asset = self.reserve_asset(pair, order.side);
            let order = state.orders.get_mut(&order_id).unwrap();
            let refund = order.take_remaining_reservation();
            if let Err(err) = self.ledger.unlock(order.owner, &asset, refund) {
                warn!(%order_id, %err, "reserve release failed");
            }
        }
    }

    /// Activate stop-limit orders whose trigger the last trade price has
    /// crossed. They join the book as plain limit orders and match when
    /// subsequent flow arrives.
    fn activate_stops(&self, state: &mut PairState, now: i64) {
        let Some(last) = state.last_price else {
            return;
        };

        let fired_bids: Vec<OrderId> = state
            .stop_bids
            .iter()
            .copied()
            .filter(|id| state.orders[id].trigger_price.is_some_and(|t| last >= t))
            .collect();
        for order_id in fired_bids {
            state.stop_bids.retain(|id| *id != order_id);
            let order = state.orders.get_mut(&order_id).unwrap();
            order.trigger(now);
            let (owner, remaining) = (order.owner, order.remaining());
            let price = order.limit_price.unwrap();
            state.bids.insert(price, order_id, owner, remaining);
            debug!(%order_id, %price, %last, "buy stop triggered");
        }

        let fired_asks: Vec<OrderId> = state
            .stop_asks
            .iter()
            .copied()
            .filter(|id| state.orders[id].trigger_price.is_some_and(|t| last <= t))
            .collect();
        for order_id in fired_asks {
            state.stop_asks.retain(|id| *id != order_id);
            let order = state.orders.get_mut(&order_id).unwrap();
            order.trigger(now);
            let (owner, remaining) = (order.owner, order.remaining());
            let price = order.limit_price.unwrap();
            state.asks.insert(price, order_id, owner, remaining);
            debug!(%order_id, %price, %last, "sell stop triggered");
        }
    }
}
