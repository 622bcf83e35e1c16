//! Order matching engine
//!
//! Accepts orders against per-pair books, matches them under price-time
//! priority, and settles every fill through the ledger in the same critical
//! section that mutates the book.
//!
//! **Key invariants:**
//! - Execution price is always the maker's resting price
//! - An order's filled quantity never exceeds its requested quantity
//! - Matching for one pair is serialized; pairs proceed in parallel
//! - A fill's book update and ledger transfer commit together

pub mod book;
pub mod engine;
pub mod matching;
pub mod validate;

pub use engine::{BookSnapshot, MatchingEngine, PlaceOutcome};
pub use validate::OrderRequest;
