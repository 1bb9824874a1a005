//! Competition lifecycle instructions

use anchor_lang::prelude::*;
use competition_logic::Phase;
use crate::state::{Competition, Config, Entry, PrizeTable, MAX_TEXT_LEN, RANKING_PER_TX};
use crate::error::PrizeError;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateCompetitionParams {
    pub title: String,
    pub subject: String,
    pub entry_fee: u64,
    pub approval_weight: u32,
    pub prize_table: PrizeTable,
    pub start_slot: u64,
    pub end_slot: u64,
}

/// Create a competition under the next id
#[derive(Accounts)]
pub struct CreateCompetition<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = creator,
        space = Competition::BASE_SPACE,
        seeds = [b"competition", config.competition_count.to_le_bytes().as_ref()],
        bump
    )]
    pub competition: Account<'info, Competition>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_competition(
    ctx: Context<CreateCompetition>,
    params: CreateCompetitionParams,
) -> Result<()> {
    let CreateCompetitionParams {
        title,
        subject,
        entry_fee,
        approval_weight,
        prize_table,
        start_slot,
        end_slot,
    } = params;
    let clock = Clock::get()?;

    require!(entry_fee > 0, PrizeError::InvalidInput);
    require!(
        title.len() <= MAX_TEXT_LEN && subject.len() <= MAX_TEXT_LEN,
        PrizeError::InvalidInput
    );
    prize_table.to_model().validate().map_err(PrizeError::from)?;
    require!(start_slot > clock.slot, PrizeError::StartInPast);
    require!(end_slot > start_slot, PrizeError::EndBeforeStart);

    let config = &mut ctx.accounts.config;
    let competition = &mut ctx.accounts.competition;

    competition.id = config.competition_count;
    competition.title = title;
    competition.subject = subject;
    competition.creator = ctx.accounts.creator.key();
    competition.entry_fee = entry_fee;
    competition.approval_weight = approval_weight;
    competition.prize_table = prize_table;
    competition.start_slot = start_slot;
    competition.end_slot = end_slot;
    competition.canceled = false;
    competition.commission_paid = false;
    competition.entrant_count = 0;
    competition.collected = 0;
    competition.disbursed = 0;
    competition.commission = 0;
    competition.refunded = 0;
    competition.prizes = 0;
    competition.swept = 0;
    competition.ranking = Vec::new();
    competition.ranked = false;
    competition.prize_pool = 0;
    competition.payouts_processed = 0;
    competition.distributed = false;
    competition.residual_swept = false;
    competition.created_slot = clock.slot;
    competition.bump = ctx.bumps.competition;

    config.competition_count = config.competition_count
        .checked_add(1)
        .ok_or(PrizeError::Overflow)?;

    msg!(
        "Competition {} created by {}, slots {}..{}, fee {}",
        competition.id,
        competition.creator,
        start_slot,
        end_slot,
        entry_fee
    );

    Ok(())
}

/// Cancel before the start slot (creator only)
#[derive(Accounts)]
pub struct CancelCompetition<'info> {
    #[account(
        mut,
        seeds = [b"competition", competition.id.to_le_bytes().as_ref()],
        bump = competition.bump,
        has_one = creator @ PrizeError::Unauthorized
    )]
    pub competition: Account<'info, Competition>,

    pub creator: Signer<'info>,
}

pub fn cancel_competition(ctx: Context<CancelCompetition>) -> Result<()> {
    let competition = &mut ctx.accounts.competition;
    let clock = Clock::get()?;

    require!(!competition.canceled, PrizeError::AlreadyCanceled);
    require!(
        competition.phase(clock.slot) == Phase::Open,
        PrizeError::AlreadyStarted
    );

    competition.canceled = true;

    msg!(
        "Competition {} canceled, {} entrants may claim refunds",
        competition.id,
        competition.entrant_count
    );
    Ok(())
}

/// Append a batch of the final order (ranking authority only)
///
/// Up to `RANKING_PER_TX` players per call, in rank order, continuing where
/// the previous batch stopped. Entry accounts of the batch are passed via
/// remaining_accounts.
#[derive(Accounts)]
#[instruction(players: Vec<Pubkey>)]
pub struct SubmitRanking<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = ranking_authority @ PrizeError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"competition", competition.id.to_le_bytes().as_ref()],
        bump = competition.bump,
        realloc = Competition::space_with_ranking(competition.ranking.len() + players.len()),
        realloc::payer = ranking_authority,
        realloc::zero = false
    )]
    pub competition: Account<'info, Competition>,

    #[account(mut)]
    pub ranking_authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn submit_ranking<'info>(
    ctx: Context<'_, '_, '_, 'info, SubmitRanking<'info>>,
    players: Vec<Pubkey>,
) -> Result<()> {
    let competition = &mut ctx.accounts.competition;
    let clock = Clock::get()?;

    require!(!competition.canceled, PrizeError::Canceled);
    require!(
        competition.phase(clock.slot).has_ended(),
        PrizeError::NotFinished
    );
    require!(!competition.ranked, PrizeError::AlreadyRanked);
    require!(players.len() <= RANKING_PER_TX, PrizeError::RankingBatchTooLarge);

    let competition_key = competition.key();
    for player in &players {
        let entry = load_entry(ctx.remaining_accounts, &competition_key, player)?;
        require!(entry.paid, PrizeError::UnknownPlayer);
    }

    competition.append_ranking(&players)?;

    if competition.ranked {
        msg!(
            "Competition {} ranked, {} players, winner {}",
            competition.id,
            competition.ranking.len(),
            competition.ranking.first().copied().unwrap_or_default()
        );
    } else {
        msg!(
            "Competition {} ranking {}/{}",
            competition.id,
            competition.ranking.len(),
            competition.entrant_count
        );
    }
    Ok(())
}

/// Find and deserialize the entry PDA of `player` in remaining_accounts
pub(crate) fn find_entry_account<'info>(
    remaining_accounts: &[AccountInfo<'info>],
    competition_key: &Pubkey,
    player_key: &Pubkey,
) -> Result<AccountInfo<'info>> {
    let (expected_pda, _bump) = Pubkey::find_program_address(
        &[b"entry", competition_key.as_ref(), player_key.as_ref()],
        &crate::ID,
    );

    remaining_accounts
        .iter()
        .find(|account| account.key() == expected_pda)
        .cloned()
        .ok_or_else(|| PrizeError::UnknownPlayer.into())
}

pub(crate) fn load_entry(
    remaining_accounts: &[AccountInfo<'_>],
    competition_key: &Pubkey,
    player_key: &Pubkey,
) -> Result<Entry> {
    let account = find_entry_account(remaining_accounts, competition_key, player_key)?;
    require_keys_eq!(*account.owner, crate::ID, PrizeError::InvalidEntryAccount);
    let data = account.try_borrow_data()?;
    let entry = Entry::try_deserialize(&mut &data[..])
        .map_err(|_| PrizeError::InvalidEntryAccount)?;
    require_keys_eq!(entry.competition, *competition_key, PrizeError::InvalidEntryAccount);
    require_keys_eq!(entry.player, *player_key, PrizeError::InvalidEntryAccount);
    Ok(entry)
}
