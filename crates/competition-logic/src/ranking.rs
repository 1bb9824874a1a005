//! Final ranking submission and prize distribution

use std::collections::BTreeSet;
use crate::error::{ArenaError, ArenaResult};
use crate::state::{AccountId, ArenaState, CompetitionStatus, Transfer, TransferReason};

impl ArenaState {
    /// Record the final order of every entrant, index 0 = first place.
    ///
    /// One-time: a second submission fails with `AlreadyRanked`.
    pub fn submit_ranking(
        &mut self,
        id: u64,
        players: Vec<AccountId>,
        caller: &AccountId,
        now: u64,
    ) -> ArenaResult<()> {
        let competition = self.competition(id)?;
        if *caller != self.config.ranking_authority {
            return Err(ArenaError::Unauthorized {
                caller: caller.to_string(),
                action: "submit rankings",
            });
        }
        if competition.canceled {
            return Err(ArenaError::Canceled(id));
        }
        if !competition.phase(now).has_ended() {
            return Err(ArenaError::NotFinished(id));
        }
        if competition.ranking.is_some() {
            return Err(ArenaError::AlreadyRanked(id));
        }
        if players.len() != competition.entrant_count as usize {
            return Err(ArenaError::IncompleteRanking {
                expected: competition.entrant_count,
                got: players.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for player in &players {
            let paid = self.entry(id, player).is_some_and(|e| e.paid);
            // a duplicate means some other entrant is missing from the list
            if !paid || !seen.insert(player) {
                return Err(ArenaError::UnknownPlayer { id, player: player.to_string() });
            }
        }

        self.competition_mut(id)?.ranking = Some(players);
        Ok(())
    }

    /// Pay every ranked player their share of the pool net of commission.
    ///
    /// Outstanding commission is settled first within the same call. Rounding
    /// dust stays in escrow.
    pub fn distribute(&mut self, id: u64) -> ArenaResult<Vec<Transfer>> {
        let competition = self.competition(id)?;
        if competition.canceled {
            return Err(ArenaError::Canceled(id));
        }
        if competition.distributed {
            return Err(ArenaError::AlreadyDistributed(id));
        }
        let ranking = competition.ranking.clone().ok_or(ArenaError::NotFinished(id))?;
        let prize_model = competition.prize_model.clone();
        let commission_paid = competition.commission_paid;

        let mut transfers = Vec::with_capacity(ranking.len() + 1);
        if !commission_paid {
            transfers.push(self.settle_commission(id)?);
        }

        let pool = self.escrow.balance(id)?.held();
        let shares = prize_model.shares(pool, ranking.len())?;

        for (rank, (player, share)) in ranking.into_iter().zip(shares).enumerate() {
            let reason = TransferReason::Prize { rank: rank as u32 };
            self.escrow.release(id, share, reason)?;
            if let Some(entry) = self.entry_mut(id, &player) {
                entry.prize = share;
            }
            if share > 0 {
                transfers.push(Transfer { competition: id, to: player, amount: share, reason });
            }
        }

        self.competition_mut(id)?.distributed = true;
        Ok(transfers)
    }

    /// Move whatever a settled competition still holds to the owner.
    ///
    /// Settled means distributed, or canceled with every fee refunded.
    pub fn sweep_residual(&mut self, id: u64, caller: &AccountId) -> ArenaResult<Transfer> {
        self.require_owner(caller, "sweep residual funds")?;
        let competition = self.competition(id)?;
        if competition.residual_swept {
            return Err(ArenaError::AlreadySwept(id));
        }

        let settled = competition.distributed
            || (competition.canceled
                && self
                    .entries
                    .get(&id)
                    .map_or(true, |m| m.values().all(|e| !e.paid || e.fee_returned)));
        if !settled {
            return Err(ArenaError::NotSettled(id));
        }

        let amount = self.escrow.balance(id)?.held();
        self.escrow.release(id, amount, TransferReason::Residual)?;
        self.competition_mut(id)?.residual_swept = true;

        Ok(Transfer {
            competition: id,
            to: self.config.owner.clone(),
            amount,
            reason: TransferReason::Residual,
        })
    }

    pub fn status(&self, id: u64, now: u64) -> ArenaResult<CompetitionStatus> {
        Ok(self.competition(id)?.status(now))
    }
}
