//! End-to-end settlement tests
//!
//! Exercise contract creation and the expiry scan against a real ledger
//! and a static oracle, including the at-most-once guarantee under
//! repeated and concurrent scans.

use std::sync::Arc;
use std::thread;

use ledger::Ledger;
use market::{AssetConfig, MarketConfig, StaticOracle};
use rust_decimal::Decimal;
use settlement::SettlementEngine;
use types::contract::{ContractStatus, Direction};
use types::errors::EngineError;
use types::ids::{AccountId, Symbol};

const TS: i64 = 1_708_123_456_789_000_000;
const MINUTE: i64 = 60;

struct Harness {
    ledger: Arc<Ledger>,
    oracle: Arc<StaticOracle>,
    engine: SettlementEngine,
}

fn harness() -> Harness {
    let ledger = Arc::new(Ledger::new());
    let oracle = Arc::new(StaticOracle::new());
    let config = Arc::new(MarketConfig::new().with_asset(
        Symbol::new("BTC"),
        AssetConfig {
            payout_rate: Decimal::from(85),
            display_precision: 8,
        },
    ));
    let engine = SettlementEngine::new(
        Arc::clone(&ledger),
        config,
        Arc::clone(&oracle) as Arc<dyn market::PriceOracle>,
    );
    Harness {
        ledger,
        oracle,
        engine,
    }
}

fn funded_account(ledger: &Ledger, amount: u64) -> AccountId {
    let account = AccountId::new();
    ledger
        .deposit(account, &Symbol::new("USD"), Decimal::from(amount))
        .unwrap();
    account
}

#[test]
fn test_create_locks_stake_and_captures_strike() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    assert_eq!(receipt.strike_price, Decimal::from(50000));
    assert_eq!(receipt.expiry_at, TS + 60_000_000_000);

    let balance = h.ledger.balance(owner, &Symbol::new("USD"));
    assert_eq!(balance.available, Decimal::from(900));
    assert_eq!(balance.locked, Decimal::from(100));

    // Strike moves with the market only for NEW contracts
    h.oracle.set(Symbol::new("BTC"), Decimal::from(60000));
    let contract = h.engine.contract(receipt.contract_id).unwrap();
    assert_eq!(contract.strike_price, Decimal::from(50000));
}

#[test]
fn test_create_without_price_is_market_unavailable() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);

    let err = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap_err();
    assert!(matches!(err, EngineError::MarketUnavailable { .. }));

    // Nothing was locked
    assert_eq!(
        h.ledger.balance(owner, &Symbol::new("USD")).locked,
        Decimal::ZERO
    );
}

#[test]
fn test_create_without_funds_rejected() {
    let h = harness();
    let owner = funded_account(&h.ledger, 50);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let err = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
}

#[test]
fn test_win_credits_stake_plus_profit() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    h.oracle.set(Symbol::new("BTC"), Decimal::from(51000));
    let summary = h.engine.settle_expired(receipt.expiry_at);
    assert_eq!(summary.settled, 1);

    let contract = h.engine.contract(receipt.contract_id).unwrap();
    assert_eq!(contract.status, ContractStatus::Won);
    assert_eq!(contract.exit_price, Some(Decimal::from(51000)));
    assert_eq!(contract.profit_loss, Some(Decimal::from(85)));

    // 900 untouched + stake 100 back + profit 85
    let balance = h.ledger.balance(owner, &Symbol::new("USD"));
    assert_eq!(balance.available, Decimal::from(1085));
    assert_eq!(balance.locked, Decimal::ZERO);
}

#[test]
fn test_loss_consumes_stake() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    h.oracle.set(Symbol::new("BTC"), Decimal::from(49000));
    h.engine.settle_expired(receipt.expiry_at);

    let contract = h.engine.contract(receipt.contract_id).unwrap();
    assert_eq!(contract.status, ContractStatus::Lost);
    assert_eq!(contract.profit_loss, Some(Decimal::from(-100)));

    let balance = h.ledger.balance(owner, &Symbol::new("USD"));
    assert_eq!(balance.available, Decimal::from(900));
    assert_eq!(balance.locked, Decimal::ZERO);
}

#[test]
fn test_tie_is_a_loss() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(100));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    // Exit exactly at strike
    h.engine.settle_expired(receipt.expiry_at);

    let contract = h.engine.contract(receipt.contract_id).unwrap();
    assert_eq!(contract.status, ContractStatus::Lost);
}

#[test]
fn test_unexpired_contracts_not_touched() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    let summary = h.engine.settle_expired(receipt.expiry_at - 1);
    assert_eq!(summary.settled, 0);
    assert_eq!(h.engine.open_contract_count(), 1);
}

#[test]
fn test_no_price_skips_contract_until_oracle_returns() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    // Oracle goes dark: the contract stays open, funds stay locked
    h.oracle.clear(&Symbol::new("BTC"));
    let summary = h.engine.settle_expired(receipt.expiry_at);
    assert_eq!(summary.settled, 0);
    assert_eq!(summary.skipped_no_price, 1);
    assert_eq!(
        h.engine.contract(receipt.contract_id).unwrap().status,
        ContractStatus::Open
    );
    assert_eq!(
        h.ledger.balance(owner, &Symbol::new("USD")).locked,
        Decimal::from(100)
    );

    // Oracle comes back: the retry settles normally
    h.oracle.set(Symbol::new("BTC"), Decimal::from(51000));
    let summary = h.engine.settle_expired(receipt.expiry_at);
    assert_eq!(summary.settled, 1);
}

#[test]
fn test_one_bad_symbol_does_not_block_the_batch() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));
    h.oracle.set(Symbol::new("ETH"), Decimal::from(3000));

    h.engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();
    h.engine
        .create_contract(owner, Symbol::new("ETH"), Direction::DOWN, Decimal::from(100), MINUTE, TS)
        .unwrap();

    h.oracle.clear(&Symbol::new("BTC"));
    h.oracle.set(Symbol::new("ETH"), Decimal::from(2900));

    let summary = h.engine.settle_expired(TS + 61_000_000_000);
    assert_eq!(summary.settled, 1);
    assert_eq!(summary.skipped_no_price, 1);
}

#[test]
fn test_settle_twice_credits_exactly_once() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let receipt = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();

    h.oracle.set(Symbol::new("BTC"), Decimal::from(51000));
    let first = h.engine.settle_expired(receipt.expiry_at);
    let second = h.engine.settle_expired(receipt.expiry_at);

    assert_eq!(first.settled, 1);
    assert_eq!(second.settled, 0);
    assert_eq!(
        h.ledger.balance(owner, &Symbol::new("USD")).available,
        Decimal::from(1085)
    );
}

#[test]
fn test_concurrent_scans_settle_each_contract_once() {
    let h = harness();
    let owner = funded_account(&h.ledger, 10_000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    for _ in 0..20 {
        h.engine
            .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
            .unwrap();
    }
    h.oracle.set(Symbol::new("BTC"), Decimal::from(51000));

    // Overlapping scheduler invocations racing over the same contract set
    let engine = Arc::new(h.engine);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.settle_expired(TS + 61_000_000_000).settled)
        })
        .collect();

    let total_settled: usize = handles.into_iter().map(|t| t.join().unwrap()).sum();
    assert_eq!(total_settled, 20);

    // 10 000 − 20 × 100 staked + 20 × 185 back
    assert_eq!(
        h.ledger.balance(owner, &Symbol::new("USD")).available,
        Decimal::from(11_700)
    );
    assert_eq!(engine.open_contract_count(), 0);
}

#[test]
fn test_contracts_for_lists_open_first() {
    let h = harness();
    let owner = funded_account(&h.ledger, 1000);
    h.oracle.set(Symbol::new("BTC"), Decimal::from(50000));

    let first = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::UP, Decimal::from(100), MINUTE, TS)
        .unwrap();
    let _second = h
        .engine
        .create_contract(owner, Symbol::new("BTC"), Direction::DOWN, Decimal::from(100), 2 * MINUTE, TS + 1)
        .unwrap();

    // Settle only the first
    h.oracle.set(Symbol::new("BTC"), Decimal::from(51000));
    h.engine.settle_expired(first.expiry_at);

    let contracts = h.engine.contracts_for(owner);
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[0].status, ContractStatus::Open);
    assert_eq!(contracts[1].status, ContractStatus::Won);
}
