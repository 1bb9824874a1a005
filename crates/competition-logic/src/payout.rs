//! Prize tables, commission and per-rank share computation

use serde::{Deserialize, Serialize};
use crate::curve::prize_curve;
use crate::error::{ArenaError, ArenaResult};

/// Maximum number of paid places in a percentage table
pub const MAX_PRIZE_PLACES: usize = 10;

/// A percentage table must add up to exactly this
pub const PERCENT_TOTAL: u32 = 100;

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for the protocol commission (10%)
pub const MAX_COMMISSION_BPS: u16 = 1_000;

/// Commission applied until the owner changes it (5%)
pub const DEFAULT_COMMISSION_BPS: u16 = 500;

/// How a competition's net pool is split by final rank
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrizeModel {
    /// Fixed percentage per place, index 0 = first place
    Percentages(Vec<u8>),
    /// Generated curve sized to the number of ranked players
    Weighted,
}

impl PrizeModel {
    /// Check the table is usable. `Weighted` is always valid.
    pub fn validate(&self) -> ArenaResult<()> {
        match self {
            PrizeModel::Percentages(table) => validate_distribution(table),
            PrizeModel::Weighted => Ok(()),
        }
    }

    /// Share owed to each rank for a pool of `pool` base units
    pub fn shares(&self, pool: u64, ranked: usize) -> ArenaResult<Vec<u64>> {
        prize_shares(pool, self, ranked)
    }
}

/// Validate a percentage table
///
/// - 1 to `MAX_PRIZE_PLACES` entries
/// - entries sum to exactly `PERCENT_TOTAL`
pub fn validate_distribution(table: &[u8]) -> ArenaResult<()> {
    if table.is_empty() {
        return Err(ArenaError::InvalidDistribution(
            "at least one paid place is required".to_string(),
        ));
    }
    if table.len() > MAX_PRIZE_PLACES {
        return Err(ArenaError::InvalidDistribution(format!(
            "{} places given, at most {} allowed",
            table.len(),
            MAX_PRIZE_PLACES
        )));
    }
    let total: u32 = table.iter().map(|&p| p as u32).sum();
    if total != PERCENT_TOTAL {
        return Err(ArenaError::InvalidDistribution(format!(
            "the prize distribution must total 100%, got {}%",
            total
        )));
    }
    Ok(())
}

/// Commission owed on `collected` at `bps` basis points, rounded down
pub fn commission_for(collected: u64, bps: u16) -> ArenaResult<u64> {
    if bps > MAX_COMMISSION_BPS {
        return Err(ArenaError::RateTooHigh { bps, max: MAX_COMMISSION_BPS });
    }
    let commission = (collected as u128)
        .checked_mul(bps as u128)
        .ok_or(ArenaError::Overflow)?
        / BPS_DENOMINATOR as u128;
    u64::try_from(commission).map_err(|_| ArenaError::Overflow)
}

/// Compute what each of `ranked` players receives from `pool`
///
/// Shares are rounded down, so the sum never exceeds `pool`. The remainder
/// stays in escrow as dust (or as unallocated places for short fields).
pub fn prize_shares(pool: u64, model: &PrizeModel, ranked: usize) -> ArenaResult<Vec<u64>> {
    model.validate()?;
    if ranked == 0 {
        return Ok(Vec::new());
    }

    let mut shares = Vec::with_capacity(ranked);
    let mut allocated = 0u64;

    match model {
        PrizeModel::Percentages(table) => {
            for rank in 0..ranked {
                let pct = table.get(rank).copied().unwrap_or(0) as u128;
                let share = (pool as u128 * pct / PERCENT_TOTAL as u128) as u64;
                allocated = allocated.checked_add(share).ok_or(ArenaError::Overflow)?;
                shares.push(share);
            }
        }
        PrizeModel::Weighted => {
            let curve = prize_curve(ranked)?;
            for weight in curve {
                let raw = (pool as f64 * weight).floor() as u64;
                // float rounding must never hand out more than the pool
                let share = raw.min(pool - allocated);
                allocated += share;
                shares.push(share);
            }
        }
    }

    debug_assert!(allocated <= pool);
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_distribution() {
        assert!(validate_distribution(&[45, 30, 15, 7, 3]).is_ok());
        assert!(validate_distribution(&[100]).is_ok());
        assert!(validate_distribution(&[10; 10]).is_ok());
    }

    #[test]
    fn test_invalid_distribution() {
        let err = validate_distribution(&[45, 30, 15, 7, 4]).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidDistribution(_)));
        assert!(err.to_string().contains("must total 100%"));

        assert!(validate_distribution(&[]).is_err());
        assert!(validate_distribution(&[50, 50, 0, 0, 0, 0, 0, 0, 0, 0, 0]).is_err());
        // u8 entries must not wrap when summed
        assert!(validate_distribution(&[200, 156]).is_err());
    }

    #[test]
    fn test_commission() {
        assert_eq!(commission_for(200_000_000, 500).unwrap(), 10_000_000);
        assert_eq!(commission_for(0, 500).unwrap(), 0);
        assert_eq!(commission_for(999, 1).unwrap(), 0);
        assert_eq!(commission_for(u64::MAX, MAX_COMMISSION_BPS).unwrap(), u64::MAX / 10);
        assert!(matches!(
            commission_for(1, 1_001),
            Err(ArenaError::RateTooHigh { bps: 1_001, max: 1_000 })
        ));
    }

    #[test]
    fn test_percentage_shares_short_field() {
        let model = PrizeModel::Percentages(vec![45, 30, 15, 7, 3]);
        let shares = model.shares(190_000_000, 2).unwrap();
        assert_eq!(shares, vec![85_500_000, 57_000_000]);
    }

    #[test]
    fn test_percentage_shares_long_field() {
        let model = PrizeModel::Percentages(vec![60, 40]);
        let shares = model.shares(1_000, 4).unwrap();
        assert_eq!(shares, vec![600, 400, 0, 0]);
    }

    #[test]
    fn test_weighted_shares() {
        let shares = PrizeModel::Weighted.shares(1_000, 2).unwrap();
        assert_eq!(shares, vec![800, 200]);

        let shares = PrizeModel::Weighted.shares(1_000_000, 1).unwrap();
        assert_eq!(shares, vec![1_000_000]);
    }

    #[test]
    fn test_no_ranked_players() {
        assert!(PrizeModel::Weighted.shares(500, 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_model_rejected_at_share_time() {
        let model = PrizeModel::Percentages(vec![50, 49]);
        assert!(model.shares(100, 2).is_err());
    }

    proptest! {
        #[test]
        fn prop_weighted_shares_never_exceed_pool(
            pool in 0u64..10_000_000_000_000,
            ranked in 1usize..300,
        ) {
            let shares = PrizeModel::Weighted.shares(pool, ranked).unwrap();
            prop_assert_eq!(shares.len(), ranked);
            let total: u64 = shares.iter().sum();
            prop_assert!(total <= pool);
            // dust is bounded by one base unit per player
            prop_assert!(pool - total <= ranked as u64 + 1);
        }

        #[test]
        fn prop_percentage_shares_never_exceed_pool(
            pool in 0u64..10_000_000_000_000,
            ranked in 1usize..20,
        ) {
            let model = PrizeModel::Percentages(vec![45, 30, 15, 7, 3]);
            let shares = model.shares(pool, ranked).unwrap();
            let total: u64 = shares.iter().sum();
            prop_assert!(total <= pool);
            for pair in shares.windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }
}
