//! Ledger service
//!
//! Holds each account's per-asset available and locked balances and exposes
//! the atomic credit/debit/lock/unlock/settle primitives every other engine
//! routes money through. Partial application is never permitted: a transfer
//! is one `settle` call, never a separate debit and credit.
//!
//! **Key invariants:**
//! - Operations on one (account, asset) pair are serialized
//! - `available` and `locked` never go negative
//! - A locked-balance shortfall freezes the account instead of continuing

pub mod ledger;
pub mod transfers;

pub use ledger::{FillTransfer, Ledger};
