use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ledger::Ledger;
use market::{MarketConfig, PriceOracle, StaticOracle};
use matching_engine::MatchingEngine;
use settlement::SettlementEngine;

/// Shared handles to the engines behind the HTTP surface
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub matching: Arc<MatchingEngine>,
    pub settlement: Arc<SettlementEngine>,
    /// Price feed the oracle route writes into; the engines only read it
    pub oracle: Arc<StaticOracle>,
}

impl AppState {
    pub fn new(config: Arc<MarketConfig>) -> Self {
        let ledger = Arc::new(Ledger::new());
        let oracle = Arc::new(StaticOracle::new());
        let oracle_handle = Arc::clone(&oracle) as Arc<dyn PriceOracle>;

        let matching = Arc::new(MatchingEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&config),
            Arc::clone(&oracle_handle),
        ));
        let settlement = Arc::new(SettlementEngine::new(
            Arc::clone(&ledger),
            config,
            oracle_handle,
        ));

        Self {
            ledger,
            matching,
            settlement,
            oracle,
        }
    }
}

/// Current wall-clock time as Unix nanos, the engines' timestamp format
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_nanos() as i64
}
