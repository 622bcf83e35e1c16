//! Per-symbol and per-pair market configuration
//!
//! Read-only lookup of payout rates, display precisions, and fee rates.
//! Captured values (a contract's payout rate, a fill's fee rates) are
//! snapshotted at use time; later config changes never rewrite history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::ids::{PairId, Symbol};
use types::numeric::DEFAULT_DISPLAY_PRECISION;

/// Configuration for a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Binary contract payout, as a percentage of the stake
    pub payout_rate: Decimal,
    /// Decimal places shown to users; fee rounding targets this
    pub display_precision: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            payout_rate: Decimal::from(85),
            display_precision: DEFAULT_DISPLAY_PRECISION,
        }
    }
}

/// Fee rates for a trading pair, as fractions of proceeds
///
/// Maker below taker to reward resting liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairFees {
    pub maker_rate: Decimal,
    pub taker_rate: Decimal,
}

impl Default for PairFees {
    fn default() -> Self {
        Self {
            maker_rate: Decimal::from_str_exact("0.001").unwrap(), // 0.10%
            taker_rate: Decimal::from_str_exact("0.002").unwrap(), // 0.20%
        }
    }
}

/// Catalog of asset and pair configuration
#[derive(Debug, Clone, Default)]
pub struct MarketConfig {
    assets: HashMap<Symbol, AssetConfig>,
    fees: HashMap<PairId, PairFees>,
    /// Asset binary contract stakes are denominated in
    stake_asset: Option<Symbol>,
}

impl MarketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset's configuration (builder style)
    pub fn with_asset(mut self, symbol: Symbol, config: AssetConfig) -> Self {
        self.assets.insert(symbol, config);
        self
    }

    /// Register a pair's fee rates (builder style)
    pub fn with_fees(mut self, pair: PairId, fees: PairFees) -> Self {
        self.fees.insert(pair, fees);
        self
    }

    /// Set the stake asset for binary contracts (builder style)
    pub fn with_stake_asset(mut self, symbol: Symbol) -> Self {
        self.stake_asset = Some(symbol);
        self
    }

    /// Configuration for `symbol`, falling back to defaults
    pub fn asset(&self, symbol: &Symbol) -> AssetConfig {
        self.assets.get(symbol).cloned().unwrap_or_default()
    }

    /// Fee rates for `pair`, falling back to defaults
    pub fn fees(&self, pair: &PairId) -> PairFees {
        self.fees.get(pair).copied().unwrap_or_default()
    }

    /// Asset binary contract stakes are locked and paid out in
    pub fn stake_asset(&self) -> Symbol {
        self.stake_asset
            .clone()
            .unwrap_or_else(|| Symbol::new("USD"))
    }
}
