//! Owner instructions

use anchor_lang::prelude::*;
use competition_logic::{DEFAULT_COMMISSION_BPS, MAX_COMMISSION_BPS};
use crate::state::{Config, MAX_ENTRANTS};
use crate::error::PrizeError;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeConfigParams {
    pub ranking_authority: Pubkey,
    /// Defaults to DEFAULT_COMMISSION_BPS
    pub commission_bps: Option<u16>,
    /// Defaults to MAX_ENTRANTS
    pub max_entrants: Option<u32>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UpdateConfigParams {
    pub owner: Option<Pubkey>,
    pub ranking_authority: Option<Pubkey>,
    pub commission_bps: Option<u16>,
    pub max_entrants: Option<u32>,
}

fn validate_max_entrants(max: u32) -> Result<()> {
    require!(max > 0 && max <= MAX_ENTRANTS, PrizeError::InvalidInput);
    Ok(())
}

/// Initialize global config (one-time setup)
#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = owner,
        space = Config::LEN,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_config(
    ctx: Context<InitializeConfig>,
    params: InitializeConfigParams,
) -> Result<()> {
    let InitializeConfigParams {
        ranking_authority,
        commission_bps,
        max_entrants,
    } = params;

    let commission_bps = commission_bps.unwrap_or(DEFAULT_COMMISSION_BPS);
    require!(commission_bps <= MAX_COMMISSION_BPS, PrizeError::RateTooHigh);
    let max_entrants = max_entrants.unwrap_or(MAX_ENTRANTS);
    validate_max_entrants(max_entrants)?;

    let config = &mut ctx.accounts.config;
    config.owner = ctx.accounts.owner.key();
    config.ranking_authority = ranking_authority;
    config.commission_bps = commission_bps;
    config.max_entrants = max_entrants;
    config.competition_count = 0;
    config.bump = ctx.bumps.config;

    msg!(
        "Config initialized by {}, ranking authority = {}, commission = {} bps",
        config.owner,
        config.ranking_authority,
        config.commission_bps
    );

    Ok(())
}

/// Update config parameters
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = owner @ PrizeError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    pub owner: Signer<'info>,
}

pub fn update_config(
    ctx: Context<UpdateConfig>,
    params: UpdateConfigParams,
) -> Result<()> {
    let UpdateConfigParams {
        owner,
        ranking_authority,
        commission_bps,
        max_entrants,
    } = params;

    // validate everything before writing anything
    if let Some(bps) = commission_bps {
        require!(bps <= MAX_COMMISSION_BPS, PrizeError::RateTooHigh);
    }
    if let Some(max) = max_entrants {
        validate_max_entrants(max)?;
    }

    let config = &mut ctx.accounts.config;

    if let Some(owner) = owner {
        config.owner = owner;
    }
    if let Some(authority) = ranking_authority {
        config.ranking_authority = authority;
    }
    if let Some(bps) = commission_bps {
        config.commission_bps = bps;
    }
    if let Some(max) = max_entrants {
        config.max_entrants = max;
    }

    msg!("Config updated");
    Ok(())
}

pub fn update_commission_rate(ctx: Context<UpdateConfig>, commission_bps: u16) -> Result<()> {
    require!(commission_bps <= MAX_COMMISSION_BPS, PrizeError::RateTooHigh);

    let config = &mut ctx.accounts.config;
    config.commission_bps = commission_bps;

    msg!("Commission rate set to {} bps", commission_bps);
    Ok(())
}
