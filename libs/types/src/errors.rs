//! Error taxonomy for the engine
//!
//! Every rejection carries a stable kind plus a human-readable reason.
//! `InvalidOrder`, `InsufficientFunds`, `NotFound`, and `InvalidState` are
//! terminal rejections; `MarketUnavailable` and `ConcurrencyConflict` are
//! transient and safe to retry because no partial state was committed.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("insufficient funds: {asset} required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("market unavailable for {symbol}")]
    MarketUnavailable { symbol: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("concurrency conflict: {reason}")]
    ConcurrencyConflict { reason: String },
}

impl EngineError {
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Whether retrying the whole operation can succeed without caller changes
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::MarketUnavailable { .. } | EngineError::ConcurrencyConflict { .. }
        )
    }
}
