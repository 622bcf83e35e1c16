//! Per-asset account balances
//!
//! A balance has an `available` (spendable) and a `locked` (reserved)
//! portion, both non-negative. Mutation happens only through the methods
//! here; the ledger wraps them with per-(account, asset) serialization.
//!
//! A shortfall in `available` is an ordinary business rejection. A shortfall
//! in `locked` means a caller released or consumed more than it reserved:
//! the engine's own bookkeeping is broken, and the ledger escalates it by
//! freezing the account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Balance mutation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("insufficient available balance: required {required}, available {available}")]
    InsufficientAvailable {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient locked balance: required {required}, locked {locked}")]
    InsufficientLocked { required: Decimal, locked: Decimal },
}

/// Balance for a single (account, asset) pair
///
/// Invariant: `available >= 0` and `locked >= 0` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub locked: Decimal,
}

impl Balance {
    /// Create a balance with everything available
    pub fn with_available(available: Decimal) -> Self {
        Self {
            available,
            locked: Decimal::ZERO,
        }
    }

    /// Total holdings across both portions
    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }

    /// Move `amount` from available to locked
    pub fn lock(&mut self, amount: Decimal) -> Result<(), BalanceError> {
        if amount > self.available {
            return Err(BalanceError::InsufficientAvailable {
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        self.locked += amount;
        Ok(())
    }

    /// Move `amount` from locked back to available
    pub fn unlock(&mut self, amount: Decimal) -> Result<(), BalanceError> {
        if amount > self.locked {
            return Err(BalanceError::InsufficientLocked {
                required: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        self.available += amount;
        Ok(())
    }

    /// Add to available (deposits, trade proceeds, contract payouts)
    pub fn credit(&mut self, amount: Decimal) {
        self.available += amount;
    }

    /// Remove from available
    pub fn debit(&mut self, amount: Decimal) -> Result<(), BalanceError> {
        if amount > self.available {
            return Err(BalanceError::InsufficientAvailable {
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        Ok(())
    }

    /// Consume previously locked funds (fill payment, executed withdrawal,
    /// binary stake at settlement)
    pub fn debit_locked(&mut self, amount: Decimal) -> Result<(), BalanceError> {
        if amount > self.locked {
            return Err(BalanceError::InsufficientLocked {
                required: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_moves_available_to_locked() {
        let mut balance = Balance::with_available(Decimal::from(1000));
        balance.lock(Decimal::from(300)).unwrap();

        assert_eq!(balance.available, Decimal::from(700));
        assert_eq!(balance.locked, Decimal::from(300));
        assert_eq!(balance.total(), Decimal::from(1000));
    }

    #[test]
    fn test_lock_insufficient_available() {
        let mut balance = Balance::with_available(Decimal::from(100));
        let err = balance.lock(Decimal::from(500)).unwrap_err();

        assert_eq!(
            err,
            BalanceError::InsufficientAvailable {
                required: Decimal::from(500),
                available: Decimal::from(100),
            }
        );
        // Failed lock mutated nothing
        assert_eq!(balance.available, Decimal::from(100));
        assert_eq!(balance.locked, Decimal::ZERO);
    }

    #[test]
    fn test_unlock_reverses_lock() {
        let mut balance = Balance::with_available(Decimal::from(1000));
        balance.lock(Decimal::from(300)).unwrap();
        balance.unlock(Decimal::from(100)).unwrap();

        assert_eq!(balance.available, Decimal::from(800));
        assert_eq!(balance.locked, Decimal::from(200));
    }

    #[test]
    fn test_unlock_beyond_locked_is_invariant_break() {
        let mut balance = Balance::with_available(Decimal::from(1000));
        balance.lock(Decimal::from(100)).unwrap();

        let err = balance.unlock(Decimal::from(200)).unwrap_err();
        assert!(matches!(err, BalanceError::InsufficientLocked { .. }));
    }

    #[test]
    fn test_debit_locked_consumes_without_credit() {
        let mut balance = Balance::with_available(Decimal::from(1000));
        balance.lock(Decimal::from(400)).unwrap();
        balance.debit_locked(Decimal::from(400)).unwrap();

        assert_eq!(balance.available, Decimal::from(600));
        assert_eq!(balance.locked, Decimal::ZERO);
        assert_eq!(balance.total(), Decimal::from(600));
    }

    #[test]
    fn test_credit_and_debit() {
        let mut balance = Balance::default();
        balance.credit(Decimal::from(50));
        assert_eq!(balance.available, Decimal::from(50));

        balance.debit(Decimal::from(20)).unwrap();
        assert_eq!(balance.available, Decimal::from(30));

        assert!(balance.debit(Decimal::from(31)).is_err());
    }
}
