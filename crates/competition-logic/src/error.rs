//! Error taxonomy shared by the engine and the on-chain program

use thiserror::Error;

/// Every rejected operation maps to exactly one of these.
///
/// A rejected call never leaves a partial write behind, so callers can retry or
/// surface the message without inspecting state first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: String, action: &'static str },

    #[error("invalid prize distribution: {0}")]
    InvalidDistribution(String),

    #[error("start boundary {start} is not after the current time {now}")]
    StartInPast { start: u64, now: u64 },

    #[error("end boundary {end} must be after start boundary {start}")]
    EndBeforeStart { start: u64, end: u64 },

    #[error("competition {0} is already canceled")]
    AlreadyCanceled(u64),

    #[error("competition {0} has already started")]
    AlreadyStarted(u64),

    #[error("competition {0} is canceled")]
    Canceled(u64),

    #[error("competition {id} is full ({cap} entrants)")]
    AlreadyFull { id: u64, cap: u32 },

    #[error("{player} has already entered competition {id}")]
    AlreadyEntered { id: u64, player: String },

    #[error("entry fee is {expected}, received {paid}")]
    WrongFee { expected: u64, paid: u64 },

    #[error("competition {0} is not canceled")]
    NotCanceled(u64),

    #[error("nothing to return to {player} for competition {id}")]
    NothingToReturn { id: u64, player: String },

    #[error("competition {0} has not started")]
    NotStarted(u64),

    #[error("commission for competition {0} has already been paid")]
    AlreadyPaid(u64),

    #[error("commission rate {bps} bps exceeds the maximum of {max} bps")]
    RateTooHigh { bps: u16, max: u16 },

    #[error("competition {0} has not finished")]
    NotFinished(u64),

    #[error("ranking lists {got} players but competition has {expected} entrants")]
    IncompleteRanking { expected: u32, got: usize },

    #[error("{player} is not a paid entrant of competition {id}")]
    UnknownPlayer { id: u64, player: String },

    #[error("competition {0} has already been ranked")]
    AlreadyRanked(u64),

    #[error("competition {0} has already been distributed")]
    AlreadyDistributed(u64),

    #[error("unsolicited deposit of {amount} rejected, funds only enter through enter")]
    UnsolicitedDeposit { amount: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("competition {id} holds {held}, cannot release {requested}")]
    InsufficientEscrow { id: u64, requested: u64, held: u64 },

    #[error("competition {0} still has funds owed to players")]
    NotSettled(u64),

    #[error("residual of competition {0} has already been swept")]
    AlreadySwept(u64),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for engine operations
pub type ArenaResult<T> = Result<T, ArenaError>;

impl ArenaError {
    pub fn competition_not_found(id: u64) -> Self {
        ArenaError::NotFound(format!("competition {id}"))
    }

    /// Stable short code, used by the on-chain program and in logs
    pub fn code(&self) -> &'static str {
        match self {
            ArenaError::NotFound(_) => "NotFound",
            ArenaError::Unauthorized { .. } => "Unauthorized",
            ArenaError::InvalidDistribution(_) => "InvalidDistribution",
            ArenaError::StartInPast { .. } => "StartInPast",
            ArenaError::EndBeforeStart { .. } => "EndBeforeStart",
            ArenaError::AlreadyCanceled(_) => "AlreadyCanceled",
            ArenaError::AlreadyStarted(_) => "AlreadyStarted",
            ArenaError::Canceled(_) => "Canceled",
            ArenaError::AlreadyFull { .. } => "AlreadyFull",
            ArenaError::AlreadyEntered { .. } => "AlreadyEntered",
            ArenaError::WrongFee { .. } => "WrongFee",
            ArenaError::NotCanceled(_) => "NotCanceled",
            ArenaError::NothingToReturn { .. } => "NothingToReturn",
            ArenaError::NotStarted(_) => "NotStarted",
            ArenaError::AlreadyPaid(_) => "AlreadyPaid",
            ArenaError::RateTooHigh { .. } => "RateTooHigh",
            ArenaError::NotFinished(_) => "NotFinished",
            ArenaError::IncompleteRanking { .. } => "IncompleteRanking",
            ArenaError::UnknownPlayer { .. } => "UnknownPlayer",
            ArenaError::AlreadyRanked(_) => "AlreadyRanked",
            ArenaError::AlreadyDistributed(_) => "AlreadyDistributed",
            ArenaError::UnsolicitedDeposit { .. } => "UnsolicitedDeposit",
            ArenaError::InvalidInput(_) => "InvalidInput",
            ArenaError::InsufficientEscrow { .. } => "InsufficientEscrow",
            ArenaError::NotSettled(_) => "NotSettled",
            ArenaError::AlreadySwept(_) => "AlreadySwept",
            ArenaError::Overflow => "Overflow",
            ArenaError::Storage(_) => "Storage",
        }
    }

    /// Failures caused by the store rather than by the caller
    pub fn is_storage(&self) -> bool {
        matches!(self, ArenaError::Storage(_))
    }
}
