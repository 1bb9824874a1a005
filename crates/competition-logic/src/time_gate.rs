//! Lifecycle phase classification against a time reference
//!
//! Boundaries are plain `u64` markers: unix seconds off-chain, slot height
//! on-chain. Nothing here reads a clock.

use serde::{Deserialize, Serialize};

/// Phase of a competition at a given time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Before the start boundary, entries and cancellation allowed
    Open,
    /// Start boundary reached, end boundary not yet reached
    Started,
    /// End boundary reached
    Ended,
    /// Canceled before start, only refunds remain
    Canceled,
}

/// Classify `now` against the competition boundaries.
///
/// `start` is inclusive for `Started`, `end` is inclusive for `Ended`.
/// A canceled competition is `Canceled` regardless of time.
pub fn classify(now: u64, start: u64, end: u64, canceled: bool) -> Phase {
    if canceled {
        Phase::Canceled
    } else if now >= end {
        Phase::Ended
    } else if now >= start {
        Phase::Started
    } else {
        Phase::Open
    }
}

impl Phase {
    pub fn has_started(self) -> bool {
        matches!(self, Phase::Started | Phase::Ended)
    }

    pub fn has_ended(self) -> bool {
        self == Phase::Ended
    }
}
