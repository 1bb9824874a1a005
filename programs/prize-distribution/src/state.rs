//! Account state definitions

use anchor_lang::prelude::*;
use competition_logic::{classify, Phase, PrizeModel, MAX_PRIZE_PLACES};
use crate::error::PrizeError;

/// Prize payouts per `distribute` transaction
pub const PAYOUTS_PER_TX: u32 = 5;

/// Ranked players per `submit_ranking` transaction, each also needs its entry account
pub const RANKING_PER_TX: usize = 10;

/// Hard cap on entrants, bounds the ranking stored in the competition account
pub const MAX_ENTRANTS: u32 = 256;

/// Maximum byte length of title and subject
pub const MAX_TEXT_LEN: usize = 64;

/// Global configuration account
#[account]
#[derive(Default)]
pub struct Config {
    /// Receives commission and residuals, may update config
    pub owner: Pubkey,
    /// Allowed to submit final rankings (separate from owner)
    pub ranking_authority: Pubkey,
    /// Commission in basis points (0 - 1000, where 100 = 1%)
    pub commission_bps: u16,
    /// Maximum entrants per competition, at most MAX_ENTRANTS
    pub max_entrants: u32,
    /// Next competition id
    pub competition_count: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + // discriminator
        32 +  // owner
        32 +  // ranking_authority
        2 +   // commission_bps
        4 +   // max_entrants
        8 +   // competition_count
        1 +   // bump
        16;   // padding
}

/// On-chain form of the prize model
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum PrizeTable {
    /// Percent per place, index 0 = first place
    Percentages(Vec<u8>),
    /// Generated curve sized to the ranked field
    #[default]
    Weighted,
}

impl PrizeTable {
    /// 1 (variant) + 4 (vec len) + one byte per place
    pub const MAX_SPACE: usize = 1 + 4 + MAX_PRIZE_PLACES;

    pub fn to_model(&self) -> PrizeModel {
        match self {
            PrizeTable::Percentages(table) => PrizeModel::Percentages(table.clone()),
            PrizeTable::Weighted => PrizeModel::Weighted,
        }
    }
}

/// Competition account, holds the escrowed lamports of its entrants.
///
/// Grows via realloc when the ranking is submitted.
#[account]
#[derive(Default)]
pub struct Competition {
    pub id: u64,
    pub title: String,
    pub subject: String,
    pub creator: Pubkey,
    /// Fixed entry fee (lamports)
    pub entry_fee: u64,
    /// Opaque ranking-weight parameter
    pub approval_weight: u32,
    pub prize_table: PrizeTable,
    /// Start boundary (slot, inclusive)
    pub start_slot: u64,
    /// End boundary (slot, inclusive)
    pub end_slot: u64,
    pub canceled: bool,
    pub commission_paid: bool,
    pub entrant_count: u32,

    // Escrow accounting. Lamports outside these figures are never paid out.
    pub collected: u64,
    pub disbursed: u64,
    pub commission: u64,
    pub refunded: u64,
    pub prizes: u64,
    pub swept: u64,

    /// Final order, index 0 = first place. Filled in batches, complete once `ranked`.
    pub ranking: Vec<Pubkey>,
    pub ranked: bool,
    /// Net pool snapshotted by the first `distribute` call
    pub prize_pool: u64,
    /// Ranks paid so far
    pub payouts_processed: u32,
    pub distributed: bool,
    pub residual_swept: bool,
    pub created_slot: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl Competition {
    pub const BASE_SPACE: usize = 8 + // discriminator
        8 +   // id
        4 + MAX_TEXT_LEN + // title
        4 + MAX_TEXT_LEN + // subject
        32 +  // creator
        8 +   // entry_fee
        4 +   // approval_weight
        PrizeTable::MAX_SPACE +
        8 +   // start_slot
        8 +   // end_slot
        1 +   // canceled
        1 +   // commission_paid
        4 +   // entrant_count
        8 * 6 + // escrow accounting
        4 +   // ranking vec len (empty)
        1 +   // ranked
        8 +   // prize_pool
        4 +   // payouts_processed
        1 +   // distributed
        1 +   // residual_swept
        8 +   // created_slot
        1 +   // bump
        32;   // padding

    /// Space needed once a ranking of `players` entries is stored
    pub fn space_with_ranking(players: usize) -> usize {
        Self::BASE_SPACE + players * 32
    }

    pub fn phase(&self, slot: u64) -> Phase {
        classify(slot, self.start_slot, self.end_slot, self.canceled)
    }

    /// Lamports still owed to someone
    pub fn held(&self) -> u64 {
        self.collected - self.disbursed
    }

    /// Append the next batch of the final order. The ranking is complete once
    /// it lists every entrant.
    pub fn append_ranking(&mut self, players: &[Pubkey]) -> Result<()> {
        require!(!self.ranked, PrizeError::AlreadyRanked);
        require!(players.len() <= RANKING_PER_TX, PrizeError::RankingBatchTooLarge);
        let remaining = (self.entrant_count as usize).saturating_sub(self.ranking.len());
        require!(players.len() <= remaining, PrizeError::IncompleteRanking);
        // an empty batch only makes sense for a field with nobody in it
        require!(!players.is_empty() || remaining == 0, PrizeError::IncompleteRanking);

        for (i, player) in players.iter().enumerate() {
            // a duplicate means some other entrant is missing from the list
            require!(
                !players[..i].contains(player) && !self.ranking.contains(player),
                PrizeError::UnknownPlayer
            );
        }

        self.ranking.extend_from_slice(players);
        self.ranked = self.ranking.len() == self.entrant_count as usize;
        Ok(())
    }

    /// Account for `amount` leaving escrow. Fails when the competition holds less.
    pub fn release(&mut self, amount: u64, outflow: Outflow) -> Result<()> {
        require!(amount <= self.held(), PrizeError::InsufficientEscrow);
        self.disbursed += amount;
        let bucket = match outflow {
            Outflow::Refund => &mut self.refunded,
            Outflow::Commission => &mut self.commission,
            Outflow::Prize => &mut self.prizes,
            Outflow::Residual => &mut self.swept,
        };
        *bucket += amount;
        Ok(())
    }
}

/// Why lamports left a competition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outflow {
    Refund,
    Commission,
    Prize,
    Residual,
}

/// Player entry in a competition
#[account]
#[derive(Default)]
pub struct Entry {
    /// Parent competition
    pub competition: Pubkey,
    /// Player wallet
    pub player: Pubkey,
    pub paid: bool,
    /// Prize received at distribution
    pub prize: u64,
    /// Whether this entry's rank has been paid
    pub prize_paid: bool,
    /// Slot when entry was created
    pub created_slot: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl Entry {
    pub const LEN: usize = 8 + // discriminator
        32 +  // competition
        32 +  // player
        1 +   // paid
        8 +   // prize
        1 +   // prize_paid
        8 +   // created_slot
        1 +   // bump
        16;   // padding
}

/// Move lamports out of a program-owned account
pub fn pay_out<'info>(from: &AccountInfo<'info>, to: &AccountInfo<'info>, amount: u64) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    **from.try_borrow_mut_lamports()? = from
        .lamports()
        .checked_sub(amount)
        .ok_or(PrizeError::InsufficientEscrow)?;
    **to.try_borrow_mut_lamports()? = to
        .lamports()
        .checked_add(amount)
        .ok_or(PrizeError::Overflow)?;
    Ok(())
}
