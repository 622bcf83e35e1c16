//! Core ledger primitives
//!
//! Balances live in a sharded concurrent map keyed by (account, asset),
//! each entry behind its own mutex. `settle` takes both entry locks in
//! deterministic key order, so concurrent transfers between the same
//! accounts cannot deadlock.

use std::sync::{Arc, Mutex};

use dashmap::{DashMap, DashSet};
use rust_decimal::Decimal;
use tracing::{debug, error};
use types::balance::{Balance, BalanceError};
use types::errors::EngineError;
use types::ids::{AccountId, Symbol};

type BalanceKey = (AccountId, Symbol);

/// Both legs of one fill, settled atomically by `Ledger::settle_fill`
///
/// `quote_gross` leaves the buyer's locked quote; `base_gross` leaves the
/// seller's locked base. Each receiver is credited net of their fee.
#[derive(Debug, Clone, PartialEq)]
pub struct FillTransfer {
    pub buyer: AccountId,
    pub seller: AccountId,
    pub base: Symbol,
    pub quote: Symbol,
    pub quote_gross: Decimal,
    pub quote_fee: Decimal,
    pub base_gross: Decimal,
    pub base_fee: Decimal,
}

/// Concurrent account/balance store
#[derive(Default)]
pub struct Ledger {
    balances: DashMap<BalanceKey, Arc<Mutex<Balance>>>,
    /// Accounts halted after an invariant violation; every mutation on them
    /// is rejected until operator intervention.
    frozen: DashSet<AccountId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `amount` from available to locked.
    ///
    /// Creates the balance entry on first touch. Fails with
    /// `InsufficientFunds` when available falls short.
    pub fn lock(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(amount)?;

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        balance
            .lock(amount)
            .map_err(|e| self.insufficient(asset, e))?;

        debug!(%account, %asset, %amount, locked = %balance.locked, "funds locked");
        Ok(())
    }

    /// Move `amount` from locked back to available.
    ///
    /// A shortfall here means a caller is releasing more than it reserved:
    /// the account is frozen and the call fails with `InvalidState`.
    pub fn unlock(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(amount)?;

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        match balance.unlock(amount) {
            Ok(()) => {
                debug!(%account, %asset, %amount, "funds unlocked");
                Ok(())
            }
            Err(e) => Err(self.freeze(account, asset, "unlock", e)),
        }
    }

    /// Add `amount` to available (deposits, contract payouts).
    pub fn credit(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(amount)?;

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        balance.credit(amount);

        debug!(%account, %asset, %amount, available = %balance.available, "funds credited");
        Ok(())
    }

    /// Remove `amount` from available.
    pub fn debit(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(amount)?;

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        balance
            .debit(amount)
            .map_err(|e| self.insufficient(asset, e))?;

        debug!(%account, %asset, %amount, "funds debited");
        Ok(())
    }

    /// Consume `amount` of locked funds without an in-ledger counterparty
    /// (executed withdrawals, binary stakes at settlement).
    pub fn debit_locked(&self, account: AccountId, asset: &Symbol, amount: Decimal) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(amount)?;

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        match balance.debit_locked(amount) {
            Ok(()) => {
                debug!(%account, %asset, %amount, "locked funds consumed");
                Ok(())
            }
            Err(e) => Err(self.freeze(account, asset, "debit_locked", e)),
        }
    }

    /// Atomically move `amount` from `from`'s locked funds to `to`'s
    /// available funds.
    pub fn settle(
        &self,
        from: AccountId,
        to: AccountId,
        asset: &Symbol,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        self.settle_with_fee(from, to, asset, amount, Decimal::ZERO)
    }

    /// `settle` with a fee withheld from the receiver's proceeds.
    ///
    /// `gross` is consumed from `from.locked`; `gross - fee` is credited to
    /// `to.available`. Both mutations happen under both balance locks, so a
    /// reader never observes the debit without the credit.
    pub fn settle_with_fee(
        &self,
        from: AccountId,
        to: AccountId,
        asset: &Symbol,
        gross: Decimal,
        fee: Decimal,
    ) -> Result<(), EngineError> {
        self.ensure_active(from)?;
        self.ensure_active(to)?;
        ensure_positive(gross)?;
        if fee < Decimal::ZERO || fee > gross {
            return Err(EngineError::invalid_state(format!(
                "fee {fee} outside [0, {gross}]"
            )));
        }

        let net = gross - fee;

        if from == to {
            // Degenerate transfer to self: locked funds return to available.
            let handle = self.handle(from, asset);
            let mut balance = handle.lock().unwrap();
            if let Err(e) = balance.debit_locked(gross) {
                return Err(self.freeze(from, asset, "settle", e));
            }
            balance.credit(net);
            return Ok(());
        }

        let from_handle = self.handle(from, asset);
        let to_handle = self.handle(to, asset);

        // Global lock order by account id keeps concurrent settles
        // between the same two accounts deadlock-free.
        let (mut from_balance, mut to_balance) = if from < to {
            let f = from_handle.lock().unwrap();
            let t = to_handle.lock().unwrap();
            (f, t)
        } else {
            let t = to_handle.lock().unwrap();
            let f = from_handle.lock().unwrap();
            (f, t)
        };

        if let Err(e) = from_balance.debit_locked(gross) {
            drop(from_balance);
            drop(to_balance);
            return Err(self.freeze(from, asset, "settle", e));
        }
        to_balance.credit(net);

        debug!(%from, %to, %asset, %gross, %fee, "settled");
        Ok(())
    }

    /// Apply both legs of a fill as one atomic unit.
    ///
    /// The buyer's quote payment and the seller's base delivery commit
    /// together under all four balance locks, each leg net of its fee.
    /// Shortfalls are detected before anything mutates, so a failed fill
    /// leaves no partial transfer.
    pub fn settle_fill(&self, transfer: &FillTransfer) -> Result<(), EngineError> {
        let FillTransfer {
            buyer,
            seller,
            base,
            quote,
            quote_gross,
            quote_fee,
            base_gross,
            base_fee,
        } = transfer;

        if buyer == seller {
            return Err(EngineError::invalid_state("fill between one account"));
        }
        self.ensure_active(*buyer)?;
        self.ensure_active(*seller)?;
        ensure_positive(*quote_gross)?;
        ensure_positive(*base_gross)?;
        if *quote_fee < Decimal::ZERO || quote_fee > quote_gross {
            return Err(EngineError::invalid_state(format!(
                "quote fee {quote_fee} outside [0, {quote_gross}]"
            )));
        }
        if *base_fee < Decimal::ZERO || base_fee > base_gross {
            return Err(EngineError::invalid_state(format!(
                "base fee {base_fee} outside [0, {base_gross}]"
            )));
        }

        // Four distinct balances, locked in global key order.
        let mut keyed: Vec<(BalanceKey, Arc<Mutex<Balance>>)> = vec![
            ((*buyer, quote.clone()), self.handle(*buyer, quote)),
            ((*seller, quote.clone()), self.handle(*seller, quote)),
            ((*buyer, base.clone()), self.handle(*buyer, base)),
            ((*seller, base.clone()), self.handle(*seller, base)),
        ];
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let order: Vec<BalanceKey> = keyed.iter().map(|(k, _)| k.clone()).collect();
        let mut guards: Vec<_> = keyed.iter().map(|(_, h)| h.lock().unwrap()).collect();
        let index = |account: AccountId, asset: &Symbol| {
            order
                .iter()
                .position(|k| k.0 == account && &k.1 == asset)
                .unwrap()
        };

        let buyer_quote = index(*buyer, quote);
        let seller_quote = index(*seller, quote);
        let buyer_base = index(*buyer, base);
        let seller_base = index(*seller, base);

        // Check both debits up front; mutate only once both can succeed.
        if guards[buyer_quote].locked < *quote_gross {
            let err = BalanceError::InsufficientLocked {
                required: *quote_gross,
                locked: guards[buyer_quote].locked,
            };
            drop(guards);
            return Err(self.freeze(*buyer, quote, "settle_fill", err));
        }
        if guards[seller_base].locked < *base_gross {
            let err = BalanceError::InsufficientLocked {
                required: *base_gross,
                locked: guards[seller_base].locked,
            };
            drop(guards);
            return Err(self.freeze(*seller, base, "settle_fill", err));
        }

        guards[buyer_quote]
            .debit_locked(*quote_gross)
            .expect("checked above");
        guards[seller_quote].credit(*quote_gross - *quote_fee);
        guards[seller_base]
            .debit_locked(*base_gross)
            .expect("checked above");
        guards[buyer_base].credit(*base_gross - *base_fee);

        debug!(
            %buyer, %seller, %base, %quote,
            %quote_gross, %quote_fee, %base_gross, %base_fee,
            "fill settled"
        );
        Ok(())
    }

    /// Consume a binary stake from locked and credit the payout, as one
    /// atomic unit on the owner's balance. `payout` may be zero (a loss).
    pub fn settle_stake(
        &self,
        account: AccountId,
        asset: &Symbol,
        stake: Decimal,
        payout: Decimal,
    ) -> Result<(), EngineError> {
        self.ensure_active(account)?;
        ensure_positive(stake)?;
        if payout < Decimal::ZERO {
            return Err(EngineError::invalid_state("negative payout"));
        }

        let handle = self.handle(account, asset);
        let mut balance = handle.lock().unwrap();
        if let Err(e) = balance.debit_locked(stake) {
            return Err(self.freeze(account, asset, "settle_stake", e));
        }
        if payout > Decimal::ZERO {
            balance.credit(payout);
        }

        debug!(%account, %asset, %stake, %payout, "stake settled");
        Ok(())
    }

    /// Snapshot of one balance; zero if never touched.
    pub fn balance(&self, account: AccountId, asset: &Symbol) -> Balance {
        self.balances
            .get(&(account, asset.clone()))
            .map(|entry| *entry.value().lock().unwrap())
            .unwrap_or_default()
    }

    /// Sum of `available + locked` across all accounts for one asset.
    ///
    /// Audit helper: matching must leave this invariant.
    pub fn total_asset(&self, asset: &Symbol) -> Decimal {
        self.balances
            .iter()
            .filter(|entry| &entry.key().1 == asset)
            .map(|entry| entry.value().lock().unwrap().total())
            .sum()
    }

    /// Whether the account has been halted by an invariant violation.
    pub fn is_frozen(&self, account: AccountId) -> bool {
        self.frozen.contains(&account)
    }

    fn handle(&self, account: AccountId, asset: &Symbol) -> Arc<Mutex<Balance>> {
        self.balances
            .entry((account, asset.clone()))
            .or_default()
            .clone()
    }

    fn ensure_active(&self, account: AccountId) -> Result<(), EngineError> {
        if self.is_frozen(account) {
            return Err(EngineError::invalid_state(format!(
                "account {account} is frozen"
            )));
        }
        Ok(())
    }

    fn insufficient(&self, asset: &Symbol, err: BalanceError) -> EngineError {
        match err {
            BalanceError::InsufficientAvailable {
                required,
                available,
            } => EngineError::InsufficientFunds {
                asset: asset.to_string(),
                required,
                available,
            },
            // Locked shortfalls route through freeze(), not here.
            BalanceError::InsufficientLocked { required, locked } => {
                EngineError::invalid_state(format!(
                    "locked shortfall: required {required}, locked {locked}"
                ))
            }
        }
    }

    fn freeze(
        &self,
        account: AccountId,
        asset: &Symbol,
        operation: &str,
        err: BalanceError,
    ) -> EngineError {
        self.frozen.insert(account);
        error!(
            %account,
            %asset,
            operation,
            %err,
            "ledger invariant violated — account frozen"
        );
        EngineError::invalid_state(format!(
            "account {account} frozen: {operation} invariant violated ({err})"
        ))
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::invalid_state(format!(
            "non-positive amount {amount}"
        )));
    }
    Ok(())
}
