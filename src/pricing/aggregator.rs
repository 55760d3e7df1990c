//! Liquidity-weighted aggregation of per-pool price candidates.

use rustc_hash::FxHashMap;

use crate::pricing::{PoolContribution, PriceMap};

/// Collapse all contributions of one iteration into a single TVL-weighted
/// price per token:
///
/// `usd_price = Σ(candidate_i * weight_i) / Σ(weight_i)`
///
/// This is a liquidity-weighted average, not a simple mean: pools with deeper
/// liquidity dominate the inferred price. Groups whose total weight is not
/// strictly positive carry no usable signal and are dropped.
pub fn aggregate_contributions(contributions: &[PoolContribution]) -> PriceMap {
    let mut sums: FxHashMap<String, (f64, f64)> = FxHashMap::default();

    for c in contributions {
        let entry = sums.entry(c.token.clone()).or_insert((0.0, 0.0));
        entry.0 += c.candidate_price * c.weight;
        entry.1 += c.weight;
    }

    let mut prices = PriceMap::default();
    for (token, (weighted_sum, total_weight)) in sums {
        if total_weight <= 0.0 {
            continue;
        }

        let price = weighted_sum / total_weight;
        if price.is_finite() && price > 0.0 {
            prices.insert(token, price);
        }
    }

    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(token: &str, price: f64, weight: f64) -> PoolContribution {
        PoolContribution {
            token: token.to_string(),
            candidate_price: price,
            weight,
        }
    }

    #[test]
    fn test_deep_pools_dominate() {
        // $2 with 200k liquidity vs $1 with 100k: weighted avg = 5/3
        let derived = aggregate_contributions(&[
            contribution("tok-b", 2.0, 200_000.0),
            contribution("tok-b", 1.0, 100_000.0),
        ]);

        let price = derived["tok-b"];
        assert!((price - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_contribution_passes_through() {
        let derived = aggregate_contributions(&[contribution("tok-b", 2.0, 100_000.0)]);
        assert_eq!(derived["tok-b"], 2.0);
    }

    #[test]
    fn test_zero_weight_group_dropped() {
        let derived = aggregate_contributions(&[contribution("tok-b", 2.0, 0.0)]);
        assert!(derived.is_empty());
    }

    #[test]
    fn test_groups_are_independent() {
        let derived = aggregate_contributions(&[
            contribution("tok-b", 2.0, 100_000.0),
            contribution("tok-c", 4.0, 50_000.0),
        ]);

        assert_eq!(derived.len(), 2);
        assert_eq!(derived["tok-b"], 2.0);
        assert_eq!(derived["tok-c"], 4.0);
    }
}
