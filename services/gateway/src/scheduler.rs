//! Recurring settlement trigger
//!
//! Replaces an external cron: a tokio interval task invokes the expiry
//! scan. The scan's optimistic guard makes overlapping or repeated
//! invocations safe, so a slow pass never needs coordination.

use std::sync::Arc;
use std::time::Duration;

use settlement::SettlementEngine;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::state::now_nanos;

pub fn spawn_settlement_scheduler(
    settlement: Arc<SettlementEngine>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = settlement.settle_expired(now_nanos());
            debug!(
                settled = summary.settled,
                skipped_no_price = summary.skipped_no_price,
                open = settlement.open_contract_count(),
                "settlement tick"
            );
        }
    })
}
