//! Binary contract settlement engine
//!
//! Creates time-boxed up/down contracts against an oracle strike price and
//! resolves them after expiry, crediting winners exactly once.
//!
//! **Key invariants:**
//! - Strike price and payout rate are captured at creation, never recomputed
//! - A contract leaves `OPEN` exactly once, even under concurrent scans
//! - No settlement ever happens without a live oracle price

pub mod engine;

pub use engine::{ContractReceipt, ScanSummary, SettlementEngine};
