//! Program error codes

use anchor_lang::prelude::*;
use competition_logic::ArenaError;

#[error_code]
pub enum PrizeError {
    #[msg("Not authorized to perform this action")]
    Unauthorized = 6000,

    #[msg("The prize distribution must total 100% across 1 to 10 places")]
    InvalidDistribution = 6001,

    #[msg("Start slot must be in the future")]
    StartInPast = 6002,

    #[msg("End slot must be after the start slot")]
    EndBeforeStart = 6003,

    #[msg("Competition is already canceled")]
    AlreadyCanceled = 6004,

    #[msg("Competition has already started")]
    AlreadyStarted = 6005,

    #[msg("Competition is canceled")]
    Canceled = 6006,

    #[msg("Competition has reached maximum entrants")]
    AlreadyFull = 6007,

    #[msg("Player has already entered this competition")]
    AlreadyEntered = 6008,

    #[msg("Paid amount does not match the entry fee")]
    WrongFee = 6009,

    #[msg("Competition is not canceled")]
    NotCanceled = 6010,

    #[msg("No entry fee to return")]
    NothingToReturn = 6011,

    #[msg("Competition has not started yet")]
    NotStarted = 6012,

    #[msg("Commission already paid")]
    AlreadyPaid = 6013,

    #[msg("Commission rate above the allowed maximum")]
    RateTooHigh = 6014,

    #[msg("Competition has not finished")]
    NotFinished = 6015,

    #[msg("Ranking must list every entrant")]
    IncompleteRanking = 6016,

    #[msg("Ranking lists a player without a paid entry")]
    UnknownPlayer = 6017,

    #[msg("Ranking already submitted")]
    AlreadyRanked = 6018,

    #[msg("Prizes already distributed")]
    AlreadyDistributed = 6019,

    #[msg("Deposits outside of enter_competition are not accepted")]
    UnsolicitedDeposit = 6020,

    #[msg("Invalid input")]
    InvalidInput = 6021,

    #[msg("Competition escrow does not hold enough funds")]
    InsufficientEscrow = 6022,

    #[msg("Competition is not settled yet")]
    NotSettled = 6023,

    #[msg("Residual funds already swept")]
    AlreadySwept = 6024,

    #[msg("Arithmetic overflow")]
    Overflow = 6025,

    #[msg("Invalid entry account in remaining_accounts")]
    InvalidEntryAccount = 6026,

    #[msg("Requested record not found")]
    NotFound = 6027,

    #[msg("Too many players in one ranking batch")]
    RankingBatchTooLarge = 6028,
}

impl From<ArenaError> for PrizeError {
    fn from(err: ArenaError) -> Self {
        msg!("{}", err);
        match err {
            ArenaError::NotFound(_) | ArenaError::Storage(_) => PrizeError::NotFound,
            ArenaError::Unauthorized { .. } => PrizeError::Unauthorized,
            ArenaError::InvalidDistribution(_) => PrizeError::InvalidDistribution,
            ArenaError::StartInPast { .. } => PrizeError::StartInPast,
            ArenaError::EndBeforeStart { .. } => PrizeError::EndBeforeStart,
            ArenaError::AlreadyCanceled(_) => PrizeError::AlreadyCanceled,
            ArenaError::AlreadyStarted(_) => PrizeError::AlreadyStarted,
            ArenaError::Canceled(_) => PrizeError::Canceled,
            ArenaError::AlreadyFull { .. } => PrizeError::AlreadyFull,
            ArenaError::AlreadyEntered { .. } => PrizeError::AlreadyEntered,
            ArenaError::WrongFee { .. } => PrizeError::WrongFee,
            ArenaError::NotCanceled(_) => PrizeError::NotCanceled,
            ArenaError::NothingToReturn { .. } => PrizeError::NothingToReturn,
            ArenaError::NotStarted(_) => PrizeError::NotStarted,
            ArenaError::AlreadyPaid(_) => PrizeError::AlreadyPaid,
            ArenaError::RateTooHigh { .. } => PrizeError::RateTooHigh,
            ArenaError::NotFinished(_) => PrizeError::NotFinished,
            ArenaError::IncompleteRanking { .. } => PrizeError::IncompleteRanking,
            ArenaError::UnknownPlayer { .. } => PrizeError::UnknownPlayer,
            ArenaError::AlreadyRanked(_) => PrizeError::AlreadyRanked,
            ArenaError::AlreadyDistributed(_) => PrizeError::AlreadyDistributed,
            ArenaError::UnsolicitedDeposit { .. } => PrizeError::UnsolicitedDeposit,
            ArenaError::InvalidInput(_) => PrizeError::InvalidInput,
            ArenaError::InsufficientEscrow { .. } => PrizeError::InsufficientEscrow,
            ArenaError::NotSettled(_) => PrizeError::NotSettled,
            ArenaError::AlreadySwept(_) => PrizeError::AlreadySwept,
            ArenaError::Overflow => PrizeError::Overflow,
        }
    }
}
