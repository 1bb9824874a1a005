//! Persistent engine state

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{ArenaError, ArenaResult};
use crate::escrow::EscrowLedger;
use crate::payout::{PrizeModel, DEFAULT_COMMISSION_BPS, MAX_COMMISSION_BPS};
use crate::time_gate::{classify, Phase};

/// Account identity of a caller (wallet address, user handle, ...)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Protocol-wide configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Receives commission and residuals, may update config
    pub owner: AccountId,
    /// Allowed to submit final rankings
    pub ranking_authority: AccountId,
    /// Commission in basis points (0 - MAX_COMMISSION_BPS)
    #[serde(default = "default_commission_bps")]
    pub commission_bps: u16,
    /// Maximum entrants per competition, uncapped when absent
    #[serde(default)]
    pub max_entrants: Option<u32>,
}

fn default_commission_bps() -> u16 {
    DEFAULT_COMMISSION_BPS
}

impl ArenaConfig {
    pub fn new(owner: AccountId, ranking_authority: AccountId) -> Self {
        Self {
            owner,
            ranking_authority,
            commission_bps: DEFAULT_COMMISSION_BPS,
            max_entrants: None,
        }
    }

    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> ArenaResult<Self> {
        let config: ArenaConfig = serde_json::from_str(json)
            .map_err(|e| ArenaError::InvalidInput(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ArenaResult<()> {
        if self.commission_bps > MAX_COMMISSION_BPS {
            return Err(ArenaError::RateTooHigh {
                bps: self.commission_bps,
                max: MAX_COMMISSION_BPS,
            });
        }
        if self.max_entrants == Some(0) {
            return Err(ArenaError::InvalidInput("max_entrants must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Owner-gated config changes, `None` leaves a field untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfigParams {
    pub owner: Option<AccountId>,
    pub ranking_authority: Option<AccountId>,
    pub commission_bps: Option<u16>,
    /// `Some(None)` removes the cap, written as `null` in JSON
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub max_entrants: Option<Option<u32>>,
}

/// Parameters of `create`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateParams {
    pub title: String,
    pub subject: String,
    pub entry_fee: u64,
    /// Opaque ranking-weight parameter, stored and returned as given
    pub approval_weight: u32,
    pub prize_model: PrizeModel,
    pub start: u64,
    pub end: u64,
}

/// Competition record, never removed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: u64,
    pub title: String,
    pub subject: String,
    pub creator: AccountId,
    pub entry_fee: u64,
    pub approval_weight: u32,
    pub prize_model: PrizeModel,
    pub start: u64,
    pub end: u64,
    pub canceled: bool,
    pub commission_paid: bool,
    pub entrant_count: u32,
    /// Final ranking, index 0 = first place
    pub ranking: Option<Vec<AccountId>>,
    pub distributed: bool,
    pub residual_swept: bool,
    pub created_at: u64,
}

/// Externally visible lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionStatus {
    Open,
    Started,
    /// End boundary reached, ranking not yet submitted
    Ended,
    Finished,
    Distributed,
    Canceled,
}

impl Competition {
    pub fn phase(&self, now: u64) -> Phase {
        classify(now, self.start, self.end, self.canceled)
    }

    pub fn status(&self, now: u64) -> CompetitionStatus {
        if self.distributed {
            return CompetitionStatus::Distributed;
        }
        if self.ranking.is_some() {
            return CompetitionStatus::Finished;
        }
        match self.phase(now) {
            Phase::Open => CompetitionStatus::Open,
            Phase::Started => CompetitionStatus::Started,
            Phase::Ended => CompetitionStatus::Ended,
            Phase::Canceled => CompetitionStatus::Canceled,
        }
    }
}

/// A player's participation in one competition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub paid: bool,
    pub fee_returned: bool,
    /// Prize received at distribution
    pub prize: u64,
}

/// Why funds left escrow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferReason {
    Refund,
    Commission,
    Prize { rank: u32 },
    Residual,
}

/// Funds released from escrow, to be settled by the payment layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub competition: u64,
    pub to: AccountId,
    pub amount: u64,
    pub reason: TransferReason,
}

/// Committed state changes, in commit order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    CompetitionCreated { id: u64, creator: AccountId, entry_fee: u64, start: u64, end: u64 },
    CompetitionCanceled { id: u64 },
    Entered { id: u64, player: AccountId, amount: u64 },
    RankingSubmitted { id: u64, players: Vec<AccountId> },
    /// `pool` is the total paid out as prizes
    Distributed { id: u64, pool: u64 },
    FundsReleased(Transfer),
    ConfigUpdated { config: ArenaConfig },
}

/// Everything that must survive a restart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaState {
    pub config: ArenaConfig,
    /// Indexed by id
    pub competitions: Vec<Competition>,
    pub entries: BTreeMap<u64, BTreeMap<AccountId, Entry>>,
    pub escrow: EscrowLedger,
}

impl ArenaState {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            competitions: Vec::new(),
            entries: BTreeMap::new(),
            escrow: EscrowLedger::default(),
        }
    }

    pub(crate) fn competition(&self, id: u64) -> ArenaResult<&Competition> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.competitions.get(idx))
            .ok_or_else(|| ArenaError::competition_not_found(id))
    }

    pub(crate) fn competition_mut(&mut self, id: u64) -> ArenaResult<&mut Competition> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.competitions.get_mut(idx))
            .ok_or_else(|| ArenaError::competition_not_found(id))
    }

    pub(crate) fn entry(&self, id: u64, player: &AccountId) -> Option<&Entry> {
        self.entries.get(&id).and_then(|m| m.get(player))
    }

    pub(crate) fn entry_mut(&mut self, id: u64, player: &AccountId) -> Option<&mut Entry> {
        self.entries.get_mut(&id).and_then(|m| m.get_mut(player))
    }

    pub(crate) fn require_owner(&self, caller: &AccountId, action: &'static str) -> ArenaResult<()> {
        if *caller != self.config.owner {
            return Err(ArenaError::Unauthorized { caller: caller.to_string(), action });
        }
        Ok(())
    }

    /// Apply owner-gated config changes
    pub fn update_config(&mut self, caller: &AccountId, params: UpdateConfigParams) -> ArenaResult<()> {
        self.require_owner(caller, "update config")?;

        let mut config = self.config.clone();
        if let Some(owner) = params.owner {
            config.owner = owner;
        }
        if let Some(authority) = params.ranking_authority {
            config.ranking_authority = authority;
        }
        if let Some(bps) = params.commission_bps {
            config.commission_bps = bps;
        }
        if let Some(cap) = params.max_entrants {
            config.max_entrants = cap;
        }
        config.validate()?;

        self.config = config;
        Ok(())
    }

    /// Owner-only commission change, bounded by `MAX_COMMISSION_BPS`
    pub fn update_commission_rate(&mut self, caller: &AccountId, bps: u16) -> ArenaResult<()> {
        self.require_owner(caller, "update the commission rate")?;
        if bps > MAX_COMMISSION_BPS {
            return Err(ArenaError::RateTooHigh { bps, max: MAX_COMMISSION_BPS });
        }
        self.config.commission_bps = bps;
        Ok(())
    }
}
