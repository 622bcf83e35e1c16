//! Contract store and settlement scan
//!
//! Contracts live in a concurrent map with a mutex per entry. The expiry
//! scan snapshots candidate ids, then re-checks the `OPEN`-and-expired
//! guard under each entry's lock before settling; a contract a concurrent
//! scan already settled is skipped silently. The status transition and the
//! ledger movement happen inside the same critical section.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use ledger::Ledger;
use market::{MarketConfig, PriceOracle};
use types::contract::{BinaryContract, ContractStatus, Direction, Outcome};
use types::errors::EngineError;
use types::ids::{AccountId, ContractId, Symbol};
use types::numeric::is_positive;

/// What a caller gets back from contract creation
#[derive(Debug, Clone, Serialize)]
pub struct ContractReceipt {
    pub contract_id: ContractId,
    pub strike_price: Decimal,
    pub expiry_at: i64,
}

/// Per-pass settlement accounting, for the scheduler's log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Contracts settled this pass (wins and losses)
    pub settled: usize,
    /// Contracts skipped because the oracle had no price; retried next pass
    pub skipped_no_price: usize,
    /// Contracts another pass settled first, or whose ledger leg failed
    pub skipped: usize,
}

/// Binary contract settlement engine
pub struct SettlementEngine {
    ledger: Arc<Ledger>,
    config: Arc<MarketConfig>,
    oracle: Arc<dyn PriceOracle>,
    contracts: DashMap<ContractId, Arc<Mutex<BinaryContract>>>,
}

impl SettlementEngine {
    pub fn new(ledger: Arc<Ledger>, config: Arc<MarketConfig>, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            ledger,
            config,
            oracle,
            contracts: DashMap::new(),
        }
    }

    /// Create a contract: capture the strike from the oracle, the payout
    /// rate from the asset config, and lock the stake, in that order, so
    /// a failed price lookup reserves nothing.
    pub fn create_contract(
        &self,
        owner: AccountId,
        symbol: Symbol,
        direction: Direction,
        stake: Decimal,
        duration_secs: i64,
        now: i64,
    ) -> Result<ContractReceipt, EngineError> {
        if !is_positive(stake) {
            return Err(EngineError::invalid_order("stake must be positive"));
        }
        if duration_secs <= 0 {
            return Err(EngineError::invalid_order("duration must be positive"));
        }

        let strike_price = self
            .oracle
            .price(&symbol)
            .ok_or_else(|| EngineError::MarketUnavailable {
                symbol: symbol.to_string(),
            })?;
        let payout_rate = self.config.asset(&symbol).payout_rate;

        let stake_asset = self.config.stake_asset();
        self.ledger.lock(owner, &stake_asset, stake)?;

        let expiry_at = now + duration_secs * 1_000_000_000;
        let contract = BinaryContract::new(
            owner,
            symbol.clone(),
            direction,
            stake,
            strike_price,
            payout_rate,
            expiry_at,
            now,
        );
        let contract_id = contract.contract_id;
        let receipt = ContractReceipt {
            contract_id,
            strike_price,
            expiry_at,
        };
        self.contracts
            .insert(contract_id, Arc::new(Mutex::new(contract)));

        info!(
            %contract_id, %symbol, ?direction, %stake, %strike_price,
            expiry_at, "contract created"
        );
        Ok(receipt)
    }

    /// Settle every contract whose expiry has passed.
    ///
    /// Runs on a recurring trigger and tolerates overlapping invocations:
    /// the guard under each entry lock makes double settlement impossible.
    /// A failed price lookup skips only that contract, never the batch.
    pub fn settle_expired(&self, now: i64) -> ScanSummary {
        let candidates: Vec<(ContractId, Arc<Mutex<BinaryContract>>)> = self
            .contracts
            .iter()
            .filter(|entry| {
                let contract = entry.value().lock().unwrap();
                contract.status == ContractStatus::Open && contract.is_expired(now)
            })
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut summary = ScanSummary::default();
        for (contract_id, handle) in candidates {
            let mut contract = handle.lock().unwrap();

            // Re-check under the lock: a concurrent pass may have won the race.
            if contract.status != ContractStatus::Open || !contract.is_expired(now) {
                summary.skipped += 1;
                continue;
            }

            let Some(exit_price) = self.oracle.price(&contract.symbol) else {
                debug!(%contract_id, symbol = %contract.symbol, "no oracle price; contract stays open");
                summary.skipped_no_price += 1;
                continue;
            };

            let outcome = BinaryContract::decide(contract.direction, contract.strike_price, exit_price);
            let payout = match outcome {
                // Winners get their stake back plus the profit
                Outcome::Win => contract.stake + contract.win_profit(),
                Outcome::Loss => Decimal::ZERO,
            };

            let stake_asset = self.config.stake_asset();
            if let Err(err) =
                self.ledger
                    .settle_stake(contract.owner, &stake_asset, contract.stake, payout)
            {
                warn!(%contract_id, %err, "stake settlement failed; contract stays open");
                summary.skipped += 1;
                continue;
            }

            contract
                .settle(outcome, exit_price, now)
                .expect("status checked OPEN under this lock");

            info!(
                %contract_id,
                owner = %contract.owner,
                status = ?contract.status,
                %exit_price,
                profit_loss = %contract.profit_loss.unwrap_or_default(),
                "contract settled"
            );
            summary.settled += 1;
        }

        if summary != ScanSummary::default() {
            info!(
                settled = summary.settled,
                skipped_no_price = summary.skipped_no_price,
                skipped = summary.skipped,
                "settlement pass complete"
            );
        }
        summary
    }

    /// Look up a single contract
    pub fn contract(&self, contract_id: ContractId) -> Option<BinaryContract> {
        self.contracts
            .get(&contract_id)
            .map(|entry| entry.value().lock().unwrap().clone())
    }

    /// All contracts for one account: open first, newest first
    pub fn contracts_for(&self, owner: AccountId) -> Vec<BinaryContract> {
        let mut contracts: Vec<BinaryContract> = self
            .contracts
            .iter()
            .map(|entry| entry.value().lock().unwrap().clone())
            .filter(|contract| contract.owner == owner)
            .collect();
        contracts.sort_by_key(|contract| {
            (
                contract.status.is_settled(),
                std::cmp::Reverse(contract.created_at),
            )
        });
        contracts
    }

    /// Number of contracts still open
    pub fn open_contract_count(&self) -> usize {
        self.contracts
            .iter()
            .filter(|entry| entry.value().lock().unwrap().status == ContractStatus::Open)
            .count()
    }
}
