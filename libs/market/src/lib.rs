//! Market collaborators consumed by the engines
//!
//! The engines never fetch prices themselves: they consume a `PriceOracle`
//! injected by the host. Payout rates, fee rates, and display precisions
//! come from a read-only `MarketConfig` catalog.

pub mod config;
pub mod oracle;

pub use config::{AssetConfig, MarketConfig, PairFees};
pub use oracle::{CachedOracle, PriceOracle, StaticOracle};
