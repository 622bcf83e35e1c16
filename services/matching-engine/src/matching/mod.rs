//! Matching support module
//!
//! Crossing predicates and per-fill fee computation.

pub mod crossing;
pub mod fees;

pub use fees::FillFees;
