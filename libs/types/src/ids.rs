//! Unique identifier types for engine entities
//!
//! All entity IDs use UUID v7 for time-sortable ordering, enabling efficient
//! chronological queries without a separate sequence column.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new id with the current timestamp embedded
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an account
    AccountId
}

uuid_id! {
    /// Unique identifier for an order
    OrderId
}

uuid_id! {
    /// Unique identifier for a trade
    TradeId
}

uuid_id! {
    /// Unique identifier for a binary contract
    ContractId
}

/// Single-asset symbol (e.g. "BTC", "USD")
///
/// Uppercase alphanumeric, no separators. Used for balances, binary
/// contracts, and oracle lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol
    ///
    /// # Panics
    /// Panics if the symbol is empty or contains a separator
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::try_new(symbol).expect("Symbol must be non-empty without separators")
    }

    /// Try to create a Symbol, returning None if invalid
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into().to_uppercase();
        if s.is_empty() || s.contains('/') || s.contains('-') {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trading pair identifier
///
/// Format: "BASE/QUOTE" (e.g. "BTC/USD", "ETH/USDT")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
    /// Create a new PairId
    ///
    /// # Panics
    /// Panics if the format is invalid (must be BASE/QUOTE)
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::try_new(symbol).expect("PairId must be in BASE/QUOTE format")
    }

    /// Try to create a PairId, returning None if invalid
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into().to_uppercase();
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
                Some(Self(s))
            }
            _ => None,
        }
    }

    /// Get the pair string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base asset (the asset being traded)
    pub fn base(&self) -> Symbol {
        let (base, _) = self.split();
        Symbol::new(base)
    }

    /// The quote asset (the asset prices are denominated in)
    pub fn quote(&self) -> Symbol {
        let (_, quote) = self.split();
        Symbol::new(quote)
    }

    /// Split into base and quote strings
    pub fn split(&self) -> (&str, &str) {
        let mut parts = self.0.split('/');
        (parts.next().unwrap(), parts.next().unwrap())
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PairId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
