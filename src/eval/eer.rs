//! Equal error rate over fake and real score distributions
//!
//! Decision rule: `score > t` ⇒ fake. At every threshold
//!
//! ```text
//! FRR(t) = |{fake ≤ t}| / |fake|     (fakes let through)
//! FAR(t) = |{real > t}| / |real|     (reals flagged)
//! ```
//!
//! The sweep starts below the lowest score (FRR 0, FAR 1) and visits each
//! distinct score in ascending order, so FRR rises to 1 while FAR falls to
//! 0. The EER is taken at the first point where FRR ≥ FAR, interpolating
//! linearly from the previous point when the curves cross between samples.

use super::MetricError;
use serde::{Deserialize, Serialize};

/// Offset of the sweep's starting threshold below the lowest score
const START_OFFSET: f64 = 1e-3;

/// Crossing point of the FRR and FAR curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eer {
    /// Error rate at the crossing, in `[0, 1]`
    pub rate: f32,
    /// Threshold at the crossing
    pub threshold: f32,
}

/// EER of `fake` scores against `real` scores.
///
/// Both distributions must be non-empty.
///
/// ```
/// use veraz::eval::compute_eer;
///
/// let eer = compute_eer(&[0.9, 0.8], &[0.2, 0.7]).unwrap();
/// assert_eq!(eer.rate, 0.0);
/// ```
pub fn compute_eer(fake: &[f32], real: &[f32]) -> Result<Eer, MetricError> {
    if fake.is_empty() || real.is_empty() {
        return Err(MetricError::EmptyDistribution { real: real.len(), fake: fake.len() });
    }

    let mut fake_sorted: Vec<f64> = fake.iter().map(|&s| f64::from(s)).collect();
    let mut real_sorted: Vec<f64> = real.iter().map(|&s| f64::from(s)).collect();
    fake_sorted.sort_by(f64::total_cmp);
    real_sorted.sort_by(f64::total_cmp);

    let mut thresholds: Vec<f64> = fake_sorted.iter().chain(&real_sorted).copied().collect();
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup();

    let n_fake = fake_sorted.len() as f64;
    let n_real = real_sorted.len() as f64;

    let mut prev = SweepPoint { threshold: thresholds[0] - START_OFFSET, frr: 0.0, far: 1.0 };
    for &threshold in &thresholds {
        // counts of scores ≤ threshold
        let fake_below = fake_sorted.partition_point(|&s| s <= threshold) as f64;
        let real_below = real_sorted.partition_point(|&s| s <= threshold) as f64;
        let point = SweepPoint {
            threshold,
            frr: fake_below / n_fake,
            far: (n_real - real_below) / n_real,
        };

        if point.frr >= point.far {
            return Ok(crossing(&prev, &point));
        }
        prev = point;
    }

    // The last distinct score has FRR = 1 and FAR = 0, so the loop returns.
    Ok(Eer { rate: 1.0, threshold: prev.threshold as f32 })
}

#[derive(Debug, Clone, Copy)]
struct SweepPoint {
    threshold: f64,
    frr: f64,
    far: f64,
}

/// Rate where the segment `prev → cur` crosses, given `prev.frr < prev.far`
/// and `cur.frr >= cur.far`
fn crossing(prev: &SweepPoint, cur: &SweepPoint) -> Eer {
    let d_prev = prev.far - prev.frr;
    let d_cur = cur.frr - cur.far;
    if d_cur == 0.0 {
        return Eer { rate: cur.frr as f32, threshold: cur.threshold as f32 };
    }

    let s = d_prev / (d_prev + d_cur);
    let rate = prev.frr + s * (cur.frr - prev.frr);
    let threshold = prev.threshold + s * (cur.threshold - prev.threshold);
    Eer { rate: rate as f32, threshold: threshold as f32 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_separation_is_zero() {
        let eer = compute_eer(&[0.9, 0.8, 0.95], &[0.1, 0.2, 0.3]).expect("both non-empty");
        assert_eq!(eer.rate, 0.0);
        assert_relative_eq!(eer.threshold, 0.3);
    }

    #[test]
    fn test_identical_distributions_is_half() {
        let scores = [0.1, 0.4, 0.6, 0.9];
        let eer = compute_eer(&scores, &scores).expect("both non-empty");
        assert_relative_eq!(eer.rate, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_single_shared_value_is_half() {
        let eer = compute_eer(&[0.5, 0.5], &[0.5]).expect("both non-empty");
        // below: (0, 1); at 0.5: (1, 0) → crossing halfway
        assert_relative_eq!(eer.rate, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_inverted_scores_is_one() {
        let eer = compute_eer(&[0.1, 0.2], &[0.8, 0.9]).expect("both non-empty");
        assert_relative_eq!(eer.rate, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_interpolated_crossing() {
        // fake {0.3, 0.9}, real {0.1, 0.5}
        // t=0.1: frr 0,   far 0.5
        // t=0.3: frr 0.5, far 0.5 → exact crossing
        let eer = compute_eer(&[0.3, 0.9], &[0.1, 0.5]).expect("both non-empty");
        assert_relative_eq!(eer.rate, 0.5);
        assert_relative_eq!(eer.threshold, 0.3);

        // fake {0.2, 0.6, 0.9}, real {0.1, 0.4}
        // t=0.1: (0, 0.5); t=0.2: (1/3, 0.5); t=0.4: (1/3, 0) → interpolate
        let eer = compute_eer(&[0.2, 0.6, 0.9], &[0.1, 0.4]).expect("both non-empty");
        assert_relative_eq!(eer.rate, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_distribution_is_error() {
        assert_eq!(
            compute_eer(&[0.4], &[]),
            Err(MetricError::EmptyDistribution { real: 0, fake: 1 })
        );
        assert_eq!(
            compute_eer(&[], &[0.4, 0.5]),
            Err(MetricError::EmptyDistribution { real: 2, fake: 0 })
        );
    }

    proptest! {
        #[test]
        fn prop_eer_in_unit_interval(
            fake in proptest::collection::vec(-20.0f32..20.0, 1..40),
            real in proptest::collection::vec(-20.0f32..20.0, 1..40),
        ) {
            let eer = compute_eer(&fake, &real).expect("both non-empty");
            prop_assert!((0.0..=1.0).contains(&eer.rate));
        }

        #[test]
        fn prop_shifted_apart_is_zero(
            real in proptest::collection::vec(0.0f32..1.0, 1..30),
            fake in proptest::collection::vec(2.0f32..3.0, 1..30),
        ) {
            prop_assert_eq!(compute_eer(&fake, &real).expect("both non-empty").rate, 0.0);
        }

        #[test]
        fn prop_identical_is_half(scores in proptest::collection::hash_set(-1000i32..1000, 1..30)) {
            let scores: Vec<f32> = scores.into_iter().map(|s| s as f32 / 100.0).collect();
            let eer = compute_eer(&scores, &scores).expect("both non-empty");
            prop_assert!((eer.rate - 0.5).abs() < 1e-5);
        }
    }
}
