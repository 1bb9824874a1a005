//! Escrow ledger: collected fees, refunds and commission
//!
//! Funds only enter through `enter` and only leave through `EscrowLedger::release`,
//! which refuses to hand out more than a competition still holds.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::{ArenaError, ArenaResult};
use crate::payout::commission_for;
use crate::state::{AccountId, ArenaState, Transfer, TransferReason};

/// Per-competition accounting
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowBalance {
    /// Gross entry fees received
    pub collected: u64,
    /// Everything released so far (sum of the fields below)
    pub disbursed: u64,
    pub commission: u64,
    pub refunded: u64,
    pub prizes: u64,
    pub swept: u64,
}

impl EscrowBalance {
    /// Funds still held for this competition
    pub fn held(&self) -> u64 {
        self.collected - self.disbursed
    }
}

/// Process-wide ledger keyed by competition id
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    balances: BTreeMap<u64, EscrowBalance>,
}

impl EscrowLedger {
    pub(crate) fn open(&mut self, id: u64) {
        self.balances.entry(id).or_default();
    }

    pub fn balance(&self, id: u64) -> ArenaResult<&EscrowBalance> {
        self.balances
            .get(&id)
            .ok_or_else(|| ArenaError::NotFound(format!("escrow balance for competition {id}")))
    }

    /// Sum of (collected - disbursed) over every competition
    pub fn total_held(&self) -> u64 {
        self.balances.values().map(EscrowBalance::held).sum()
    }

    /// Credit an entry fee. Only reached through `enter`.
    pub(crate) fn record_collection(&mut self, id: u64, amount: u64) -> ArenaResult<()> {
        let balance = self.balance_mut(id)?;
        balance.collected = balance.collected.checked_add(amount).ok_or(ArenaError::Overflow)?;
        Ok(())
    }

    /// Release `amount` out of escrow. Fails without touching the balance when
    /// the competition does not hold enough.
    pub(crate) fn release(&mut self, id: u64, amount: u64, reason: TransferReason) -> ArenaResult<()> {
        let balance = self.balance_mut(id)?;
        let held = balance.held();
        if amount > held {
            return Err(ArenaError::InsufficientEscrow { id, requested: amount, held });
        }

        balance.disbursed += amount;
        let bucket = match reason {
            TransferReason::Refund => &mut balance.refunded,
            TransferReason::Commission => &mut balance.commission,
            TransferReason::Prize { .. } => &mut balance.prizes,
            TransferReason::Residual => &mut balance.swept,
        };
        *bucket += amount;
        Ok(())
    }

    fn balance_mut(&mut self, id: u64) -> ArenaResult<&mut EscrowBalance> {
        self.balances
            .get_mut(&id)
            .ok_or_else(|| ArenaError::NotFound(format!("escrow balance for competition {id}")))
    }
}

impl ArenaState {
    /// Return the entry fee of a canceled competition to `player`
    pub fn refund(&mut self, id: u64, player: &AccountId) -> ArenaResult<Transfer> {
        let competition = self.competition(id)?;
        if !competition.canceled {
            return Err(ArenaError::NotCanceled(id));
        }
        let fee = competition.entry_fee;

        match self.entry(id, player) {
            Some(entry) if entry.paid && !entry.fee_returned => {}
            _ => {
                return Err(ArenaError::NothingToReturn { id, player: player.to_string() });
            }
        }

        self.escrow.release(id, fee, TransferReason::Refund)?;
        if let Some(entry) = self.entry_mut(id, player) {
            entry.fee_returned = true;
        }

        Ok(Transfer {
            competition: id,
            to: player.clone(),
            amount: fee,
            reason: TransferReason::Refund,
        })
    }

    /// Pay the protocol commission of a started competition to the owner.
    ///
    /// Anyone may trigger it, the funds always go to the configured owner.
    pub fn withdraw_commission(&mut self, id: u64, now: u64) -> ArenaResult<Transfer> {
        let competition = self.competition(id)?;
        if competition.canceled {
            return Err(ArenaError::Canceled(id));
        }
        if !competition.phase(now).has_started() {
            return Err(ArenaError::NotStarted(id));
        }
        if competition.commission_paid {
            return Err(ArenaError::AlreadyPaid(id));
        }
        self.settle_commission(id)
    }

    /// Commission transfer without the lifecycle checks, shared with `distribute`
    pub(crate) fn settle_commission(&mut self, id: u64) -> ArenaResult<Transfer> {
        let collected = self.escrow.balance(id)?.collected;
        let amount = commission_for(collected, self.config.commission_bps)?;

        self.escrow.release(id, amount, TransferReason::Commission)?;
        self.competition_mut(id)?.commission_paid = true;

        Ok(Transfer {
            competition: id,
            to: self.config.owner.clone(),
            amount,
            reason: TransferReason::Commission,
        })
    }

    /// Funds outside `enter` are never accepted into escrow
    pub fn receive_unsolicited(&self, _from: &AccountId, amount: u64) -> ArenaResult<()> {
        Err(ArenaError::UnsolicitedDeposit { amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_fails_closed() {
        let mut ledger = EscrowLedger::default();
        ledger.open(0);
        ledger.record_collection(0, 100).unwrap();

        ledger.release(0, 60, TransferReason::Prize { rank: 0 }).unwrap();
        let err = ledger.release(0, 41, TransferReason::Prize { rank: 1 }).unwrap_err();
        assert_eq!(err, ArenaError::InsufficientEscrow { id: 0, requested: 41, held: 40 });

        let balance = ledger.balance(0).unwrap();
        assert_eq!(balance.disbursed, 60);
        assert_eq!(balance.prizes, 60);
        assert_eq!(balance.held(), 40);
    }

    #[test]
    fn test_breakdown_adds_up() {
        let mut ledger = EscrowLedger::default();
        ledger.open(3);
        ledger.record_collection(3, 1_000).unwrap();
        ledger.release(3, 50, TransferReason::Commission).unwrap();
        ledger.release(3, 900, TransferReason::Prize { rank: 0 }).unwrap();
        ledger.release(3, 50, TransferReason::Residual).unwrap();

        let b = ledger.balance(3).unwrap();
        assert_eq!(b.disbursed, b.commission + b.refunded + b.prizes + b.swept);
        assert_eq!(b.held(), 0);
        assert_eq!(ledger.total_held(), 0);
    }

    #[test]
    fn test_unknown_balance() {
        let mut ledger = EscrowLedger::default();
        assert!(matches!(ledger.record_collection(9, 1), Err(ArenaError::NotFound(_))));
        assert!(matches!(ledger.balance(9), Err(ArenaError::NotFound(_))));
    }

    #[test]
    fn test_total_held_spans_competitions() {
        let mut ledger = EscrowLedger::default();
        ledger.open(0);
        ledger.open(1);
        ledger.record_collection(0, 10).unwrap();
        ledger.record_collection(1, 25).unwrap();
        ledger.release(1, 5, TransferReason::Refund).unwrap();
        assert_eq!(ledger.total_held(), 30);
    }
}
