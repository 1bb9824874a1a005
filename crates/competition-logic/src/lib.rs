//! Competition Logic for Prize Arena
//!
//! Pooled-stake trading competitions: players pay a fixed entry fee into
//! escrow, a ranking authority submits the final order and the net pool is
//! paid out by rank.
//!
//! This crate is compiled to:
//! - Native engine (default `engine` feature, transactional and persistent)
//! - Pure math for the on-chain program (`default-features = false`)
//! - WASM (for frontend prize previews)

mod curve;
mod error;
mod payout;
mod time_gate;

#[cfg(feature = "engine")]
mod arena;
#[cfg(feature = "engine")]
mod clock;
#[cfg(feature = "engine")]
mod escrow;
#[cfg(feature = "engine")]
mod ranking;
#[cfg(feature = "engine")]
mod registry;
#[cfg(feature = "engine")]
mod state;
#[cfg(feature = "engine")]
mod store;

#[cfg(feature = "wasm")]
mod wasm;

pub use curve::{prize_curve, CURVE_DAMPING};
pub use error::{ArenaError, ArenaResult};
pub use payout::{
    commission_for, prize_shares, validate_distribution, PrizeModel, BPS_DENOMINATOR,
    DEFAULT_COMMISSION_BPS, MAX_COMMISSION_BPS, MAX_PRIZE_PLACES, PERCENT_TOTAL,
};
pub use time_gate::{classify, Phase};

#[cfg(feature = "engine")]
pub use arena::{Arena, SharedArena};
#[cfg(feature = "engine")]
pub use clock::{Clock, ManualClock, SystemClock};
#[cfg(feature = "engine")]
pub use escrow::{EscrowBalance, EscrowLedger};
#[cfg(feature = "engine")]
pub use state::{
    AccountId, ArenaConfig, ArenaState, Competition, CompetitionStatus, CreateParams, Entry, Event,
    Transfer, TransferReason, UpdateConfigParams,
};
#[cfg(feature = "engine")]
pub use store::{JsonFileStore, MemoryStore, Store};
