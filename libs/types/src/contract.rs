//! Binary (up/down) contract types
//!
//! A contract captures its strike price and payout rate at creation and
//! never recomputes them. Settlement transitions status away from `OPEN`
//! exactly once; the settlement engine guards that transition so repeated
//! or concurrent scans observe a no-op.

use crate::errors::EngineError;
use crate::ids::{AccountId, ContractId, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction the owner predicts the price will move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    UP,
    DOWN,
}

/// Contract status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractStatus {
    /// Running; will be picked up by the settlement scan after expiry
    Open,
    /// Settled in the owner's favor (terminal)
    Won,
    /// Settled against the owner (terminal)
    Lost,
}

impl ContractStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, ContractStatus::Won | ContractStatus::Lost)
    }
}

/// Settlement outcome for an expired contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

/// A time-boxed binary option against a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryContract {
    pub contract_id: ContractId,
    pub owner: AccountId,
    pub symbol: Symbol,
    pub direction: Direction,
    /// Amount locked at creation; consumed at settlement
    pub stake: Decimal,
    /// Oracle price at creation; immutable thereafter
    pub strike_price: Decimal,
    /// Payout percentage captured from asset config at creation
    pub payout_rate: Decimal,
    pub expiry_at: i64, // Unix nanos
    pub status: ContractStatus,
    /// Oracle price at settlement; None until settled
    pub exit_price: Option<Decimal>,
    /// `stake × payout_rate / 100` on a win, `-stake` on a loss
    pub profit_loss: Option<Decimal>,
    pub created_at: i64,
    pub settled_at: Option<i64>,
}

impl BinaryContract {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: AccountId,
        symbol: Symbol,
        direction: Direction,
        stake: Decimal,
        strike_price: Decimal,
        payout_rate: Decimal,
        expiry_at: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            contract_id: ContractId::new(),
            owner,
            symbol,
            direction,
            stake,
            strike_price,
            payout_rate,
            expiry_at,
            status: ContractStatus::Open,
            exit_price: None,
            profit_loss: None,
            created_at: timestamp,
            settled_at: None,
        }
    }

    /// Whether the expiry timestamp has passed
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry_at <= now
    }

    /// Outcome rule: UP wins strictly above strike, DOWN wins strictly
    /// below. A price exactly at strike is a loss; the house keeps ties.
    pub fn decide(direction: Direction, strike: Decimal, exit: Decimal) -> Outcome {
        let win = match direction {
            Direction::UP => exit > strike,
            Direction::DOWN => exit < strike,
        };
        if win {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    /// Profit on a win: `stake × payout_rate / 100`
    pub fn win_profit(&self) -> Decimal {
        self.stake * self.payout_rate / Decimal::ONE_HUNDRED
    }

    /// Record the settlement outcome
    ///
    /// Errors unless the contract is still `Open` (the at-most-once guard).
    pub fn settle(
        &mut self,
        outcome: Outcome,
        exit_price: Decimal,
        timestamp: i64,
    ) -> Result<(), EngineError> {
        if self.status.is_settled() {
            return Err(EngineError::invalid_state(format!(
                "contract {} already settled",
                self.contract_id
            )));
        }

        match outcome {
            Outcome::Win => {
                self.status = ContractStatus::Won;
                self.profit_loss = Some(self.win_profit());
            }
            Outcome::Loss => {
                self.status = ContractStatus::Lost;
                self.profit_loss = Some(-self.stake);
            }
        }
        self.exit_price = Some(exit_price);
        self.settled_at = Some(timestamp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1708123456789000000;

    fn contract(direction: Direction, strike: u64) -> BinaryContract {
        BinaryContract::new(
            AccountId::new(),
            Symbol::new("BTC"),
            direction,
            Decimal::from(100),
            Decimal::from(strike),
            Decimal::from(85),
            TS + 60_000_000_000,
            TS,
        )
    }

    #[test]
    fn test_up_wins_above_strike() {
        assert_eq!(
            BinaryContract::decide(Direction::UP, Decimal::from(100), Decimal::from(101)),
            Outcome::Win
        );
    }

    #[test]
    fn test_down_wins_below_strike() {
        assert_eq!(
            BinaryContract::decide(Direction::DOWN, Decimal::from(100), Decimal::from(99)),
            Outcome::Win
        );
    }

    #[test]
    fn test_tie_is_a_loss_both_directions() {
        assert_eq!(
            BinaryContract::decide(Direction::UP, Decimal::from(100), Decimal::from(100)),
            Outcome::Loss
        );
        assert_eq!(
            BinaryContract::decide(Direction::DOWN, Decimal::from(100), Decimal::from(100)),
            Outcome::Loss
        );
    }

    #[test]
    fn test_win_settlement_records_profit() {
        let mut c = contract(Direction::UP, 100);
        c.settle(Outcome::Win, Decimal::from(105), TS + 1).unwrap();

        assert_eq!(c.status, ContractStatus::Won);
        assert_eq!(c.exit_price, Some(Decimal::from(105)));
        assert_eq!(c.profit_loss, Some(Decimal::from(85)));
        assert!(c.settled_at.is_some());
    }

    #[test]
    fn test_loss_settlement_records_negative_stake() {
        let mut c = contract(Direction::UP, 100);
        c.settle(Outcome::Loss, Decimal::from(95), TS + 1).unwrap();

        assert_eq!(c.status, ContractStatus::Lost);
        assert_eq!(c.profit_loss, Some(Decimal::from(-100)));
    }

    #[test]
    fn test_second_settlement_rejected() {
        let mut c = contract(Direction::DOWN, 100);
        c.settle(Outcome::Loss, Decimal::from(100), TS + 1).unwrap();

        let err = c.settle(Outcome::Win, Decimal::from(90), TS + 2).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
        // First settlement stands
        assert_eq!(c.status, ContractStatus::Lost);
        assert_eq!(c.exit_price, Some(Decimal::from(100)));
    }

    #[test]
    fn test_expiry_check() {
        let c = contract(Direction::UP, 100);
        assert!(!c.is_expired(TS));
        assert!(c.is_expired(TS + 60_000_000_000));
        assert!(c.is_expired(TS + 61_000_000_000));
    }

    #[test]
    fn test_fractional_payout_rate() {
        let c = BinaryContract::new(
            AccountId::new(),
            Symbol::new("ETH"),
            Direction::UP,
            Decimal::from(40),
            Decimal::from(3000),
            Decimal::from_str_exact("72.5").unwrap(),
            TS + 1,
            TS,
        );
        assert_eq!(c.win_profit(), Decimal::from_str_exact("29.000").unwrap());
    }
}
