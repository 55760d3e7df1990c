//! Per-pool TVL calculation and derived-price contributions.

use crate::db::models::Pool;
use crate::pricing::PriceMap;
use crate::utils::{validate_price_ratio, validate_usd_tvl};

/// One pool's vote for an unpriced token, weighted by the pool's liquidity.
///
/// Ephemeral: produced during a single iteration and consumed immediately by
/// the aggregator, never persisted.
#[derive(Debug, Clone)]
pub struct PoolContribution {
    pub token: String,
    pub candidate_price: f64,
    /// Pool TVL in USD. Deeper pools dominate the aggregated price.
    pub weight: f64,
}

/// Look up a usable price for a token: present, finite and strictly positive.
fn known_price(prices: &PriceMap, token: &str) -> Option<f64> {
    prices.get(token).copied().filter(|p| p.is_finite() && *p > 0.0)
}

/// Evaluate one pool against the current price set, returning a contribution
/// for a newly inferable token price, if any.
///
/// Policy by case:
/// - Both legs unpriced: nothing to propagate from.
/// - Both legs priced: emit nothing. Re-deriving a known leg from its own
///   pool feeds the iteration output back into its input and oscillates, so
///   an all-known pool is deliberately inert.
/// - Exactly one leg priced: derive the other leg from the reserve ratio,
///   provided the unknown side has a positive reserve, the unknown leg is
///   not the anchor, and the pool carries positive USD value.
///
/// Reserves are decimal-adjusted before any ratio is taken; a pool whose
/// reserves fail to normalize is skipped entirely.
pub fn pool_contribution(
    pool: &Pool,
    prices: &PriceMap,
    anchor_token: &str,
) -> Option<PoolContribution> {
    let reserve0 = pool.reserve0_adjusted()?;
    let reserve1 = pool.reserve1_adjusted()?;

    let price0 = known_price(prices, &pool.token0);
    let price1 = known_price(prices, &pool.token1);

    let (known_reserve, known_usd, unknown_reserve, unknown_token) = match (price0, price1) {
        (Some(_), Some(_)) | (None, None) => return None,
        (Some(p0), None) => (reserve0, p0, reserve1, &pool.token1),
        (None, Some(p1)) => (reserve1, p1, reserve0, &pool.token0),
    };

    // The anchor price is external and authoritative; never derive it from
    // pool reserves, whatever the graph looks like.
    if unknown_token == anchor_token {
        return None;
    }

    // A zero reserve on the unknown side makes the ratio undefined.
    if unknown_reserve <= 0.0 {
        return None;
    }

    // With one leg unpriced, the pool's USD value reduces to the known side.
    // A zero TVL (known-side reserve drained) means there is no liquidity to
    // trust the ratio with.
    let tvl = validate_usd_tvl(known_reserve * known_usd);
    if tvl <= 0.0 {
        return None;
    }

    let ratio = validate_price_ratio(known_reserve / unknown_reserve)?;
    let candidate_price = ratio * known_usd;
    if !candidate_price.is_finite() || candidate_price <= 0.0 {
        return None;
    }

    Some(PoolContribution {
        token: unknown_token.clone(),
        candidate_price,
        weight: tvl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: &str = "anchor";

    fn prices(entries: &[(&str, f64)]) -> PriceMap {
        entries.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    fn pool(r0: &str, d0: u8, r1: &str, d1: u8) -> Pool {
        Pool::new("pool-1", ANCHOR, r0, d0, "tok-b", r1, d1)
    }

    #[test]
    fn test_derives_unknown_leg_from_reserve_ratio() {
        // 1 anchor at $100k against 50,000 tok-b => tok-b at $2
        let p = pool("1", 0, "50000", 0);
        let c = pool_contribution(&p, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).unwrap();

        assert_eq!(c.token, "tok-b");
        assert!((c.candidate_price - 2.0).abs() < 1e-12);
        assert!((c.weight - 100_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_decimal_adjustment_happens_before_ratio() {
        // Same pool in atomic units: 8-decimal anchor, 6-decimal tok-b
        let p = pool("100000000", 8, "50000000000", 6);
        let c = pool_contribution(&p, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).unwrap();

        assert!((c.candidate_price - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_known_pool_is_inert() {
        // Both legs priced: replaying the calculator must emit nothing,
        // otherwise prices oscillate across iterations.
        let p = pool("1", 0, "50000", 0);
        let known = prices(&[(ANCHOR, 100_000.0), ("tok-b", 2.0)]);

        assert!(pool_contribution(&p, &known, ANCHOR).is_none());
    }

    #[test]
    fn test_all_unknown_pool_emits_nothing() {
        let p = Pool::new("pool-2", "tok-c", "10", 0, "tok-d", "20", 0);
        assert!(pool_contribution(&p, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).is_none());
    }

    #[test]
    fn test_zero_reserve_is_degenerate() {
        // Known side drained: TVL is zero, nothing to trust
        let drained = pool("0", 0, "50000", 0);
        assert!(pool_contribution(&drained, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).is_none());

        // Unknown side empty: ratio undefined
        let empty = pool("1", 0, "0", 0);
        assert!(pool_contribution(&empty, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).is_none());
    }

    #[test]
    fn test_anchor_is_never_derived() {
        // tok-b priced, anchor leg unpriced in the map: the pool must not
        // produce an anchor contribution
        let p = pool("1", 0, "50000", 0);
        let without_anchor = prices(&[("tok-b", 2.0)]);

        assert!(pool_contribution(&p, &without_anchor, ANCHOR).is_none());
    }

    #[test]
    fn test_unparseable_reserve_skips_pool() {
        let p = Pool::new("pool-3", ANCHOR, "garbage", 0, "tok-b", "50000", 0);
        assert!(pool_contribution(&p, &prices(&[(ANCHOR, 100_000.0)]), ANCHOR).is_none());
    }
}
