//! Price oracle seam
//!
//! `price()` returning `None` means the market is unavailable; callers map
//! that to `MarketUnavailable` and retry later. A stale or synthetic price
//! is never substituted: a contract or lock estimate without a live price
//! simply does not happen.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use types::ids::Symbol;

/// Last-trade price source for a symbol
///
/// Queried fresh at order creation (market-buy lock estimation), contract
/// creation, and each settlement pass.
pub trait PriceOracle: Send + Sync {
    /// Current price for `symbol`, or `None` when unavailable.
    ///
    /// Implementations must never return a non-positive price; callers
    /// treat one as unavailable.
    fn price(&self, symbol: &Symbol) -> Option<Decimal>;
}

/// In-memory oracle backed by a symbol → price map
///
/// The production host feeds it from its market-data source; tests use
/// `set`/`clear` to move the market or take it offline.
#[derive(Default)]
pub struct StaticOracle {
    prices: RwLock<HashMap<Symbol, Decimal>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the price for a symbol
    pub fn set(&self, symbol: Symbol, price: Decimal) {
        self.prices.write().unwrap().insert(symbol, price);
    }

    /// Remove a symbol's price, making it unavailable
    pub fn clear(&self, symbol: &Symbol) {
        self.prices.write().unwrap().remove(symbol);
    }
}

impl PriceOracle for StaticOracle {
    fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices
            .read()
            .unwrap()
            .get(symbol)
            .copied()
            .filter(|p| *p > Decimal::ZERO)
    }
}

/// TTL-bounded caching decorator over another oracle
///
/// Owned and injected by the caller, never ambient global state. Entries
/// older than the TTL are re-fetched; unavailable results are not cached,
/// so recovery is immediate.
pub struct CachedOracle<O> {
    inner: O,
    ttl: Duration,
    entries: Mutex<HashMap<Symbol, (Instant, Decimal)>>,
}

impl<O: PriceOracle> CachedOracle<O> {
    pub fn new(inner: O, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<O: PriceOracle> PriceOracle for CachedOracle<O> {
    fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        let mut entries = self.entries.lock().unwrap();
        if let Some((fetched_at, price)) = entries.get(symbol) {
            if fetched_at.elapsed() < self.ttl {
                return Some(*price);
            }
        }

        match self.inner.price(symbol) {
            Some(price) => {
                entries.insert(symbol.clone(), (Instant::now(), price));
                Some(price)
            }
            None => {
                entries.remove(symbol);
                None
            }
        }
    }
}
