//! Convergence measurement between successive price sets.

use crate::pricing::PriceMap;

/// Outcome of comparing the price set before and after one iteration.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceReport {
    pub converged: bool,
    /// Mean of `abs(new - old) / old` over tokens present in both sets.
    pub average_relative_change: f64,
}

/// Pure comparison of two successive price sets.
///
/// Only tokens present in both sets enter the average; a token with a
/// non-positive baseline is skipped (relative change is undefined). Tokens
/// appearing for the first time have nothing to compare against — the engine
/// counts those separately as discoveries and forces another iteration for
/// them regardless of this measurement.
pub fn measure(previous: &PriceMap, current: &PriceMap, tolerance: f64) -> ConvergenceReport {
    let mut total_change = 0.0;
    let mut compared = 0usize;

    for (token, &old) in previous {
        if old <= 0.0 {
            continue;
        }
        let Some(&new) = current.get(token) else {
            continue;
        };
        total_change += (new - old).abs() / old;
        compared += 1;
    }

    let average_relative_change =
        if compared > 0 { total_change / compared as f64 } else { 0.0 };

    ConvergenceReport {
        converged: average_relative_change <= tolerance,
        average_relative_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.001; // 0.1%

    fn prices(entries: &[(&str, f64)]) -> PriceMap {
        entries.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    #[test]
    fn test_identical_sets_converge() {
        let set = prices(&[("a", 100_000.0), ("b", 2.0)]);
        let report = measure(&set, &set, TOLERANCE);

        assert!(report.converged);
        assert_eq!(report.average_relative_change, 0.0);
    }

    #[test]
    fn test_large_change_does_not_converge() {
        let previous = prices(&[("b", 2.0)]);
        let current = prices(&[("b", 3.0)]);
        let report = measure(&previous, &current, TOLERANCE);

        assert!(!report.converged);
        assert!((report.average_relative_change - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_change_averages_over_common_tokens() {
        // b moves 50%, a is unchanged: average is 25%
        let previous = prices(&[("a", 100_000.0), ("b", 2.0)]);
        let current = prices(&[("a", 100_000.0), ("b", 3.0)]);
        let report = measure(&previous, &current, TOLERANCE);

        assert!((report.average_relative_change - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_new_tokens_do_not_enter_the_average() {
        let previous = prices(&[("a", 100_000.0)]);
        let current = prices(&[("a", 100_000.0), ("b", 2.0)]);
        let report = measure(&previous, &current, TOLERANCE);

        assert!(report.converged);
        assert_eq!(report.average_relative_change, 0.0);
    }

    #[test]
    fn test_non_positive_baseline_skipped() {
        let previous = prices(&[("a", 0.0), ("b", 2.0)]);
        let current = prices(&[("a", 5.0), ("b", 2.0)]);
        let report = measure(&previous, &current, TOLERANCE);

        // Only b is comparable, and b is unchanged
        assert_eq!(report.average_relative_change, 0.0);
        assert!(report.converged);
    }

    #[test]
    fn test_empty_sets_trivially_converge() {
        let report = measure(&PriceMap::default(), &PriceMap::default(), TOLERANCE);
        assert!(report.converged);
        assert_eq!(report.average_relative_change, 0.0);
    }
}
