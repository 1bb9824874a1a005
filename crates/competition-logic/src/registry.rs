//! Competition registry: create, read, cancel and enter

use crate::error::{ArenaError, ArenaResult};
use crate::state::{AccountId, ArenaState, Competition, CreateParams, Entry};
use crate::time_gate::Phase;

impl ArenaState {
    /// Register a new competition and open its escrow balance.
    ///
    /// The creator pays nothing at creation.
    pub fn create(&mut self, creator: &AccountId, params: CreateParams, now: u64) -> ArenaResult<u64> {
        let CreateParams {
            title,
            subject,
            entry_fee,
            approval_weight,
            prize_model,
            start,
            end,
        } = params;

        if entry_fee == 0 {
            return Err(ArenaError::InvalidInput("entry fee must be greater than 0".to_string()));
        }
        prize_model.validate()?;
        if start <= now {
            return Err(ArenaError::StartInPast { start, now });
        }
        if end <= start {
            return Err(ArenaError::EndBeforeStart { start, end });
        }

        let id = self.competitions.len() as u64;
        self.competitions.push(Competition {
            id,
            title,
            subject,
            creator: creator.clone(),
            entry_fee,
            approval_weight,
            prize_model,
            start,
            end,
            canceled: false,
            commission_paid: false,
            entrant_count: 0,
            ranking: None,
            distributed: false,
            residual_swept: false,
            created_at: now,
        });
        self.entries.insert(id, Default::default());
        self.escrow.open(id);

        Ok(id)
    }

    /// Snapshot of a competition
    pub fn get(&self, id: u64) -> ArenaResult<Competition> {
        self.competition(id).cloned()
    }

    /// Number of competitions ever created
    pub fn count(&self) -> u64 {
        self.competitions.len() as u64
    }

    /// Snapshot of a player's entry
    pub fn get_entry(&self, id: u64, player: &AccountId) -> ArenaResult<Entry> {
        self.competition(id)?;
        self.entry(id, player)
            .cloned()
            .ok_or_else(|| ArenaError::NotFound(format!("entry of {player} in competition {id}")))
    }

    /// Cancel before the start boundary. Collected fees stay in escrow until
    /// each entrant claims a refund.
    pub fn cancel(&mut self, id: u64, caller: &AccountId, now: u64) -> ArenaResult<()> {
        let competition = self.competition_mut(id)?;
        if competition.creator != *caller {
            return Err(ArenaError::Unauthorized {
                caller: caller.to_string(),
                action: "cancel this competition",
            });
        }
        if competition.canceled {
            return Err(ArenaError::AlreadyCanceled(id));
        }
        if competition.phase(now) != Phase::Open {
            return Err(ArenaError::AlreadyStarted(id));
        }

        competition.canceled = true;
        Ok(())
    }

    /// Pay the exact entry fee and join before the start boundary
    pub fn enter(&mut self, id: u64, player: &AccountId, paid: u64, now: u64) -> ArenaResult<()> {
        let cap = self.config.max_entrants;
        let competition = self.competition(id)?;

        if competition.canceled {
            return Err(ArenaError::Canceled(id));
        }
        if competition.phase(now) != Phase::Open {
            return Err(ArenaError::AlreadyStarted(id));
        }
        if let Some(cap) = cap {
            if competition.entrant_count >= cap {
                return Err(ArenaError::AlreadyFull { id, cap });
            }
        }
        if self.entry(id, player).is_some_and(|e| e.paid) {
            return Err(ArenaError::AlreadyEntered { id, player: player.to_string() });
        }
        if paid != competition.entry_fee {
            return Err(ArenaError::WrongFee { expected: competition.entry_fee, paid });
        }
        let entrant_count = competition
            .entrant_count
            .checked_add(1)
            .ok_or(ArenaError::Overflow)?;

        self.escrow.record_collection(id, paid)?;
        self.competition_mut(id)?.entrant_count = entrant_count;
        self.entries.entry(id).or_default().insert(
            player.clone(),
            Entry { paid: true, fee_returned: false, prize: 0 },
        );

        Ok(())
    }
}
