//! Player instructions

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use competition_logic::Phase;
use crate::state::{pay_out, Competition, Config, Entry, Outflow};
use crate::error::PrizeError;

/// Enter a competition by paying its exact entry fee
#[derive(Accounts)]
pub struct EnterCompetition<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"competition", competition.id.to_le_bytes().as_ref()],
        bump = competition.bump
    )]
    pub competition: Account<'info, Competition>,

    /// Second entry fails here, the PDA already exists
    #[account(
        init,
        payer = player,
        space = Entry::LEN,
        seeds = [b"entry", competition.key().as_ref(), player.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, Entry>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// `amount` is what the player attaches, it must equal the entry fee
pub fn enter_competition(ctx: Context<EnterCompetition>, amount: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    let competition = &mut ctx.accounts.competition;
    let entry = &mut ctx.accounts.entry;
    let player = &ctx.accounts.player;
    let clock = Clock::get()?;

    require!(!competition.canceled, PrizeError::Canceled);
    require!(
        competition.phase(clock.slot) == Phase::Open,
        PrizeError::AlreadyStarted
    );
    require!(
        competition.entrant_count < config.max_entrants,
        PrizeError::AlreadyFull
    );
    require!(amount == competition.entry_fee, PrizeError::WrongFee);

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: player.to_account_info(),
                to: competition.to_account_info(),
            },
        ),
        amount,
    )?;

    entry.competition = competition.key();
    entry.player = player.key();
    entry.paid = true;
    entry.prize = 0;
    entry.prize_paid = false;
    entry.created_slot = clock.slot;
    entry.bump = ctx.bumps.entry;

    competition.collected = competition.collected
        .checked_add(amount)
        .ok_or(PrizeError::Overflow)?;
    competition.entrant_count += 1;

    msg!(
        "Player {} entered competition {} ({} entrants)",
        player.key(),
        competition.id,
        competition.entrant_count
    );

    Ok(())
}

/// Reclaim the entry fee of a canceled competition
#[derive(Accounts)]
pub struct ClaimRefund<'info> {
    #[account(
        mut,
        seeds = [b"competition", competition.id.to_le_bytes().as_ref()],
        bump = competition.bump
    )]
    pub competition: Account<'info, Competition>,

    #[account(
        mut,
        seeds = [b"entry", competition.key().as_ref(), player.key().as_ref()],
        bump = entry.bump,
        has_one = player,
        has_one = competition,
        close = player
    )]
    pub entry: Account<'info, Entry>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
    let competition = &mut ctx.accounts.competition;
    let entry = &ctx.accounts.entry;
    let player = &ctx.accounts.player;

    require!(competition.canceled, PrizeError::NotCanceled);
    require!(entry.paid, PrizeError::NothingToReturn);

    let refund_amount = competition.entry_fee;
    competition.release(refund_amount, Outflow::Refund)?;
    pay_out(&competition.to_account_info(), &player.to_account_info(), refund_amount)?;

    // Entry closed via `close = player`, a second claim finds no account
    msg!(
        "Refunded {} lamports to player {} from competition {}",
        refund_amount,
        player.key(),
        competition.id
    );

    Ok(())
}
