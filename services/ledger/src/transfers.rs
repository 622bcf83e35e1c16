//! Deposit and withdrawal flows
//!
//! Withdrawals are two-step: the request locks the funds, then an
//! administrative approve consumes them (the payout happens off-ledger) or
//! a reject releases them. Both administrative actions route through the
//! same primitives as everything else.

use rust_decimal::Decimal;
use tracing::info;
use types::errors::EngineError;
use types::ids::{AccountId, Symbol};

use crate::ledger::Ledger;

impl Ledger {
    /// Credit an approved deposit.
    pub fn deposit(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.credit(account, asset, amount)?;
        info!(%account, %asset, %amount, "deposit credited");
        Ok(())
    }

    /// Reserve funds for a pending withdrawal.
    pub fn request_withdrawal(
        &self,
        account: AccountId,
        asset: &Symbol,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        self.lock(account, asset, amount)?;
        info!(%account, %asset, %amount, "withdrawal requested");
        Ok(())
    }

    /// Approve a pending withdrawal: the reserved funds leave the ledger.
    pub fn approve_withdrawal(
        &self,
        account: AccountId,
        asset: &Symbol,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        self.debit_locked(account, asset, amount)?;
        info!(%account, %asset, %amount, "withdrawal approved");
        Ok(())
    }

    /// Reject a pending withdrawal: the reservation returns to available.
    pub fn reject_withdrawal(
        &self,
        account: AccountId,
        asset: &Symbol,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        self.unlock(account, asset, amount)?;
        info!(%account, %asset, %amount, "withdrawal rejected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Symbol {
        Symbol::new("USD")
    }

    #[test]
    fn test_withdrawal_reject_restores_funds() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, &usd(), Decimal::from(500)).unwrap();

        ledger
            .request_withdrawal(account, &usd(), Decimal::from(200))
            .unwrap();
        assert_eq!(ledger.balance(account, &usd()).locked, Decimal::from(200));

        ledger
            .reject_withdrawal(account, &usd(), Decimal::from(200))
            .unwrap();
        let balance = ledger.balance(account, &usd());
        assert_eq!(balance.available, Decimal::from(500));
        assert_eq!(balance.locked, Decimal::ZERO);
    }

    #[test]
    fn test_withdrawal_approve_consumes_funds() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, &usd(), Decimal::from(500)).unwrap();

        ledger
            .request_withdrawal(account, &usd(), Decimal::from(200))
            .unwrap();
        ledger
            .approve_withdrawal(account, &usd(), Decimal::from(200))
            .unwrap();

        let balance = ledger.balance(account, &usd());
        assert_eq!(balance.available, Decimal::from(300));
        assert_eq!(balance.total(), Decimal::from(300));
    }

    #[test]
    fn test_withdrawal_request_beyond_available_rejected() {
        let ledger = Ledger::new();
        let account = AccountId::new();
        ledger.deposit(account, &usd(), Decimal::from(100)).unwrap();

        let err = ledger
            .request_withdrawal(account, &usd(), Decimal::from(150))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
    }
}
