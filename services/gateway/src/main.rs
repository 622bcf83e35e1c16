mod error;
mod handlers;
mod models;
mod router;
mod scheduler;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use market::{AssetConfig, MarketConfig, PairFees};
use router::create_router;
use rust_decimal::Decimal;
use state::AppState;
use tokio::net::TcpListener;
use types::ids::{PairId, Symbol};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting trading engine gateway");

    let config = Arc::new(default_market_config());
    let state = AppState::new(config);

    // Recurring settlement trigger; overlapping passes are safe
    let _settlement_task = scheduler::spawn_settlement_scheduler(
        Arc::clone(&state.settlement),
        Duration::from_secs(60),
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Asset and pair configuration served by this deployment.
fn default_market_config() -> MarketConfig {
    let usd = AssetConfig {
        payout_rate: Decimal::from(85),
        display_precision: 2,
    };
    let crypto = AssetConfig {
        payout_rate: Decimal::from(85),
        display_precision: 8,
    };

    MarketConfig::new()
        .with_stake_asset(Symbol::new("USD"))
        .with_asset(Symbol::new("USD"), usd)
        .with_asset(Symbol::new("BTC"), crypto.clone())
        .with_asset(Symbol::new("ETH"), crypto.clone())
        .with_asset(Symbol::new("SOL"), crypto)
        .with_fees(PairId::new("BTC/USD"), PairFees::default())
        .with_fees(PairId::new("ETH/USD"), PairFees::default())
        .with_fees(PairId::new("SOL/USD"), PairFees::default())
}
