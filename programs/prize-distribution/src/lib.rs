//! Prize Distribution - pooled-stake trading competitions
//!
//! Players pay a fixed entry fee into a competition PDA. After the end slot
//! the ranking authority submits the final order and the net pool is paid
//! out by rank, using the same curve and share math as `competition-logic`.

use anchor_lang::prelude::*;

mod state;
mod instructions;
mod error;

use instructions::*;
pub use state::PrizeTable;

declare_id!("8BgtJjYmE6qtHWUFbdLELu9kWrkmfNFeDdnDtBvx8TTT");

#[program]
pub mod prize_distribution {
    use super::*;

    /// Initialize the global config (one-time setup)
    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        params: InitializeConfigParams,
    ) -> Result<()> {
        instructions::admin::initialize_config(ctx, params)
    }

    /// Update config parameters (owner only)
    pub fn update_config(
        ctx: Context<UpdateConfig>,
        params: UpdateConfigParams,
    ) -> Result<()> {
        instructions::admin::update_config(ctx, params)
    }

    /// Change the commission rate, at most 10% (owner only)
    pub fn update_commission_rate(ctx: Context<UpdateConfig>, commission_bps: u16) -> Result<()> {
        instructions::admin::update_commission_rate(ctx, commission_bps)
    }

    /// Create a competition under the next id
    pub fn create_competition(
        ctx: Context<CreateCompetition>,
        params: CreateCompetitionParams,
    ) -> Result<()> {
        instructions::competition::create_competition(ctx, params)
    }

    /// Cancel before the start slot (creator only)
    pub fn cancel_competition(ctx: Context<CancelCompetition>) -> Result<()> {
        instructions::competition::cancel_competition(ctx)
    }

    /// Enter a competition paying exactly its entry fee
    pub fn enter_competition(ctx: Context<EnterCompetition>, amount: u64) -> Result<()> {
        instructions::player::enter_competition(ctx, amount)
    }

    /// Claim the entry fee back from a canceled competition
    pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
        instructions::player::claim_refund(ctx)
    }

    /// Pay the commission of a started competition to the owner
    pub fn withdraw_commission(ctx: Context<PayOwner>) -> Result<()> {
        instructions::payout::withdraw_commission(ctx)
    }

    /// Submit the next batch of the final ranking (ranking authority only)
    pub fn submit_ranking<'info>(
        ctx: Context<'_, '_, '_, 'info, SubmitRanking<'info>>,
        players: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::competition::submit_ranking(ctx, players)
    }

    /// Pay a batch of ranks (up to 5 per tx)
    pub fn distribute<'info>(ctx: Context<'_, '_, '_, 'info, PayOwner<'info>>) -> Result<()> {
        instructions::payout::distribute(ctx)
    }

    /// Move leftovers of a settled competition to the owner
    pub fn sweep_residual(ctx: Context<SweepResidual>) -> Result<()> {
        instructions::payout::sweep_residual(ctx)
    }
}
