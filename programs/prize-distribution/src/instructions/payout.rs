//! Commission, prize distribution and residual sweep

use anchor_lang::prelude::*;
use competition_logic::{commission_for, prize_shares};
use crate::state::{pay_out, Competition, Config, Entry, Outflow, PAYOUTS_PER_TX};
use crate::error::PrizeError;
use super::competition::find_entry_account;

/// Shared accounts of every instruction that pays the owner
#[derive(Accounts)]
pub struct PayOwner<'info> {
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

    /// CHECK: Validated against config.owner
    #[account(
        mut,
        constraint = owner.key() == config.owner @ PrizeError::Unauthorized
    )]
    pub owner: AccountInfo<'info>,

    /// Anyone may trigger, funds always go to the owner
    pub caller: Signer<'info>,
}

fn settle_commission<'info>(
    competition: &mut Account<'info, Competition>,
    owner: &AccountInfo<'info>,
    commission_bps: u16,
) -> Result<u64> {
    let amount = commission_for(competition.collected, commission_bps).map_err(PrizeError::from)?;
    competition.release(amount, Outflow::Commission)?;
    competition.commission_paid = true;
    pay_out(&competition.to_account_info(), owner, amount)?;
    Ok(amount)
}

/// Pay the commission of a started competition to the owner
pub fn withdraw_commission(ctx: Context<PayOwner>) -> Result<()> {
    let config = &ctx.accounts.config;
    let competition = &mut ctx.accounts.competition;
    let clock = Clock::get()?;

    require!(!competition.canceled, PrizeError::Canceled);
    require!(
        competition.phase(clock.slot).has_started(),
        PrizeError::NotStarted
    );
    require!(!competition.commission_paid, PrizeError::AlreadyPaid);

    let amount = settle_commission(competition, &ctx.accounts.owner, config.commission_bps)?;

    msg!(
        "Withdrew {} lamports commission from competition {}",
        amount,
        competition.id
    );
    Ok(())
}

/// Pay the next batch of ranks (up to PAYOUTS_PER_TX per tx)
///
/// remaining_accounts holds, for every rank in the batch, the entry PDA and
/// the player wallet. The first call settles outstanding commission and fixes
/// the prize pool.
pub fn distribute<'info>(ctx: Context<'_, '_, '_, 'info, PayOwner<'info>>) -> Result<()> {
    let config = &ctx.accounts.config;
    let competition = &mut ctx.accounts.competition;
    let remaining_accounts = ctx.remaining_accounts;

    require!(!competition.canceled, PrizeError::Canceled);
    require!(!competition.distributed, PrizeError::AlreadyDistributed);
    require!(competition.ranked, PrizeError::NotFinished);

    if !competition.commission_paid {
        let amount = settle_commission(competition, &ctx.accounts.owner, config.commission_bps)?;
        msg!("Settled {} lamports commission", amount);
    }
    if competition.payouts_processed == 0 {
        competition.prize_pool = competition.held();
    }

    let ranked = competition.ranking.len();
    let shares = prize_shares(
        competition.prize_pool,
        &competition.prize_table.to_model(),
        ranked,
    )
    .map_err(PrizeError::from)?;

    let start = competition.payouts_processed as usize;
    let end = ranked.min(start + PAYOUTS_PER_TX as usize);
    let competition_key = competition.key();

    for rank in start..end {
        let player = competition.ranking[rank];
        let share = shares[rank];

        let entry_info = find_entry_account(remaining_accounts, &competition_key, &player)?;
        require!(entry_info.is_writable, PrizeError::InvalidEntryAccount);
        require_keys_eq!(*entry_info.owner, crate::ID, PrizeError::InvalidEntryAccount);
        let wallet = remaining_accounts
            .iter()
            .find(|account| account.key() == player)
            .ok_or(PrizeError::InvalidEntryAccount)?;

        let mut entry = {
            let data = entry_info.try_borrow_data()?;
            Entry::try_deserialize(&mut &data[..])
                .map_err(|_| PrizeError::InvalidEntryAccount)?
        };
        require_keys_eq!(entry.player, player, PrizeError::InvalidEntryAccount);
        require!(!entry.prize_paid, PrizeError::AlreadyDistributed);

        entry.prize = share;
        entry.prize_paid = true;
        {
            let mut data = entry_info.try_borrow_mut_data()?;
            let mut writer = &mut data[..];
            entry.try_serialize(&mut writer)
                .map_err(|_| PrizeError::InvalidEntryAccount)?;
        }

        competition.release(share, Outflow::Prize)?;
        pay_out(&competition.to_account_info(), wallet, share)?;

        msg!("Rank {}: {} receives {} lamports", rank + 1, player, share);
    }

    competition.payouts_processed = end as u32;
    if end == ranked {
        competition.distributed = true;
        msg!(
            "Competition {} distributed, {} lamports left in escrow",
            competition.id,
            competition.held()
        );
    } else {
        msg!(
            "Competition {}: {}/{} ranks paid",
            competition.id,
            end,
            ranked
        );
    }

    Ok(())
}

/// Owner-only: move what a settled competition still holds to the owner
#[derive(Accounts)]
pub struct SweepResidual<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = owner @ PrizeError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"competition", competition.id.to_le_bytes().as_ref()],
        bump = competition.bump
    )]
    pub competition: Account<'info, Competition>,

    #[account(mut)]
    pub owner: Signer<'info>,
}

pub fn sweep_residual(ctx: Context<SweepResidual>) -> Result<()> {
    let competition = &mut ctx.accounts.competition;

    require!(!competition.residual_swept, PrizeError::AlreadySwept);
    let settled = competition.distributed
        || (competition.canceled && competition.refunded == competition.collected);
    require!(settled, PrizeError::NotSettled);

    let amount = competition.held();
    competition.release(amount, Outflow::Residual)?;
    competition.residual_swept = true;
    pay_out(
        &competition.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        amount,
    )?;

    msg!(
        "Swept {} lamports residual from competition {}",
        amount,
        competition.id
    );
    Ok(())
}
