//! Weighted prize curve
//!
//! Damped Fibonacci-style weights, largest weight to first place.
//! Pure and allocation-bounded by the player count.

use crate::error::{ArenaError, ArenaResult};

/// Damping factor of the recurrence. Larger values push more of the pool
/// towards the top half of the field.
pub const CURVE_DAMPING: f64 = 5.0;

/// Unnormalized recurrence for `n` players.
///
/// - `w[0] = 1 - 1/n`
/// - `w[1] = 2`
/// - `w[i] = w[i-1] / n / CURVE_DAMPING + w[i-2]`
pub(crate) fn raw_weights(n: usize) -> Vec<f64> {
    let len = n as f64;
    let mut weights: Vec<f64> = Vec::with_capacity(n);
    for i in 0..n {
        let next = match i {
            0 => 1.0 - 1.0 / len,
            1 => 2.0,
            _ => weights[i - 1] / len / CURVE_DAMPING + weights[i - 2],
        };
        weights.push(next);
    }
    weights
}

/// Generate the normalized prize curve for `n` ranked players
///
/// # Returns
/// `n` non-negative weights, non-increasing, summing to 1.0 (within float
/// tolerance). Index 0 is first place.
///
/// # Errors
/// `InvalidInput` when `n == 0`.
pub fn prize_curve(n: usize) -> ArenaResult<Vec<f64>> {
    if n == 0 {
        return Err(ArenaError::InvalidInput(
            "prize curve needs at least one player".to_string(),
        ));
    }
    // w[0] is zero for a single player, the whole pool goes to them
    if n == 1 {
        return Ok(vec![1.0]);
    }

    let mut weights = raw_weights(n);
    weights.sort_by(|a, b| b.total_cmp(a));

    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOLERANCE: f64 = 1e-12;

    fn assert_curve(n: usize, expected: &[f64]) {
        let curve = prize_curve(n).unwrap();
        assert_eq!(curve.len(), expected.len(), "n={}", n);
        for (i, (got, want)) in curve.iter().zip(expected).enumerate() {
            assert!(
                (got - want).abs() < TOLERANCE,
                "n={}, rank={}: got {}, want {}",
                n, i, got, want
            );
        }
    }

    #[test]
    fn test_zero_players_rejected() {
        assert!(matches!(prize_curve(0), Err(ArenaError::InvalidInput(_))));
    }

    #[test]
    fn test_single_player_takes_all() {
        assert_eq!(prize_curve(1).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_fixed_outputs_small_fields() {
        assert_curve(2, &[0.8, 0.2]);
        assert_curve(3, &[0.5769230769230769, 0.23076923076923078, 0.19230769230769232]);
        assert_curve(4, &[
            0.36198493575542756,
            0.35445281346920693,
            0.15064244572441293,
            0.13291980505095258,
        ]);
        assert_curve(5, &[
            0.30482544429746367,
            0.29955330610992886,
            0.14399647246026726,
            0.1318034546883687,
            0.11982132244397156,
        ]);
    }

    #[test]
    fn test_fixed_outputs_larger_fields() {
        assert_curve(6, &[
            0.23452696700627876,
            0.23085875159370878,
            0.22744704590513184,
            0.11004646237709963,
            0.10235117065730932,
            0.0947696024604716,
        ]);
        assert_curve(7, &[
            0.2084228024974779,
            0.20560414344793043,
            0.2029533245154833,
            0.10460800394837547,
            0.09865306673416181,
            0.09277866263564952,
            0.08697999622092142,
        ]);
        assert_curve(8, &[
            0.17354382989626463,
            0.17139509471628123,
            0.16935348147049553,
            0.1674177141506289,
            0.08594940719933529,
            0.08166452983142826,
            0.07743069279466586,
            0.07324524994090013,
        ]);
        assert_curve(9, &[
            0.15859451650028214,
            0.15684769023099343,
            0.15517831961120152,
            0.1535855802603534,
            0.08213150470688663,
            0.07860718211799146,
            0.07512167789063606,
            0.07167327078816492,
            0.0682602578934904,
        ]);
        assert_curve(10, &[
            0.13775383626182733,
            0.1363467847670013,
            0.13499427198608205,
            0.13369575691395724,
            0.13245072014459802,
            0.0703525747413019,
            0.06762563904596186,
            0.06492575360624021,
            0.06225183846796107,
            0.05960282406506911,
        ]);
    }

    #[test]
    fn test_raw_recurrence() {
        let w = raw_weights(4);
        assert_eq!(w[0], 0.75);
        assert_eq!(w[1], 2.0);
        assert!((w[2] - (2.0 / 4.0 / 5.0 + 0.75)).abs() < TOLERANCE);
        assert!((w[3] - (w[2] / 4.0 / 5.0 + 2.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_determinism() {
        for n in 1..=10 {
            assert_eq!(prize_curve(n).unwrap(), prize_curve(n).unwrap());
        }
    }

    proptest! {
        #[test]
        fn prop_curve_is_normalized_and_descending(n in 1usize..2000) {
            let curve = prize_curve(n).unwrap();
            prop_assert_eq!(curve.len(), n);

            let sum: f64 = curve.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum={}", sum);

            for w in &curve {
                prop_assert!(*w >= 0.0);
            }
            for pair in curve.windows(2) {
                prop_assert!(pair[0] >= pair[1], "{} < {}", pair[0], pair[1]);
            }
        }
    }
}
