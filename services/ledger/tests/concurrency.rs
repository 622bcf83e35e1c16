//! Concurrency tests for the ledger
//!
//! Hammers the same two accounts from many threads and verifies the
//! conservation and non-negativity invariants hold under every
//! interleaving, with no deadlock between opposing settles.

use ledger::{FillTransfer, Ledger};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use types::ids::{AccountId, Symbol};

fn usd() -> Symbol {
    Symbol::new("USD")
}

#[test]
fn test_opposing_settles_do_not_deadlock() {
    let ledger = Arc::new(Ledger::new());
    let a = AccountId::new();
    let b = AccountId::new();

    ledger.credit(a, &usd(), Decimal::from(10_000)).unwrap();
    ledger.credit(b, &usd(), Decimal::from(10_000)).unwrap();
    ledger.lock(a, &usd(), Decimal::from(10_000)).unwrap();
    ledger.lock(b, &usd(), Decimal::from(10_000)).unwrap();

    // a→b and b→a settles racing in both directions
    let handles: Vec<_> = [(a, b), (b, a)]
        .into_iter()
        .map(|(from, to)| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    ledger.settle(from, to, &usd(), Decimal::from(10)).unwrap();
                    // Re-reserve what just arrived so the loop can continue
                    ledger.lock(to, &usd(), Decimal::from(10)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.total_asset(&usd()), Decimal::from(20_000));
}

#[test]
fn test_concurrent_locks_never_overdraw() {
    let ledger = Arc::new(Ledger::new());
    let account = AccountId::new();
    ledger.credit(account, &usd(), Decimal::from(100)).unwrap();

    // 8 threads each try 100 locks of 10; only 10 can ever succeed
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut won = 0u32;
                for _ in 0..100 {
                    if ledger.lock(account, &usd(), Decimal::from(10)).is_ok() {
                        won += 1;
                    }
                }
                won
            })
        })
        .collect();

    let total_won: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(total_won, 10);
    let balance = ledger.balance(account, &usd());
    assert_eq!(balance.available, Decimal::ZERO);
    assert_eq!(balance.locked, Decimal::from(100));
}

#[test]
fn test_concurrent_fills_conserve_value() {
    let ledger = Arc::new(Ledger::new());
    let btc = Symbol::new("BTC");
    let buyer = AccountId::new();
    let seller = AccountId::new();

    ledger.credit(buyer, &usd(), Decimal::from(10_000)).unwrap();
    ledger.credit(seller, &btc, Decimal::from(100)).unwrap();
    ledger.lock(buyer, &usd(), Decimal::from(10_000)).unwrap();
    ledger.lock(seller, &btc, Decimal::from(100)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let btc = btc.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    ledger
                        .settle_fill(&FillTransfer {
                            buyer,
                            seller,
                            base: btc.clone(),
                            quote: usd(),
                            quote_gross: Decimal::from(100),
                            quote_fee: Decimal::ZERO,
                            base_gross: Decimal::ONE,
                            base_fee: Decimal::ZERO,
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // No value created or destroyed in either asset
    assert_eq!(ledger.total_asset(&usd()), Decimal::from(10_000));
    assert_eq!(ledger.total_asset(&btc), Decimal::from(100));
    assert_eq!(ledger.balance(seller, &usd()).available, Decimal::from(10_000));
    assert_eq!(ledger.balance(buyer, &btc).available, Decimal::from(100));
}
