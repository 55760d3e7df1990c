//! The fixed-point price iteration loop.

use anyhow::{bail, Result};
use log::{debug, info};

use crate::db::models::Pool;
use crate::pricing::{aggregate_contributions, measure, pool_contribution, PriceMap};
use crate::utils::{validate_usd_price, validate_usd_price_vs_anchor};

/// Hard cap on iterations. The propagation depth of a healthy pool graph is
/// its hop count from the anchor, so ten covers any realistic topology.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default convergence tolerance: 0.1% average relative change, as a fraction.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Drives the {TVL calculation → weighted aggregation → merge → convergence
/// check} loop over an immutable pool snapshot.
///
/// The snapshot and all prices are passed in explicitly; the engine holds no
/// state between runs and performs no I/O.
pub struct PriceEngine {
    anchor_token: String,
    max_iterations: u32,
    tolerance: f64,
}

/// Finalized price set plus run diagnostics.
#[derive(Debug, Clone)]
pub struct PriceRun {
    pub prices: PriceMap,
    pub anchor_price_usd: f64,
    /// Iterations executed. Equals the configured cap when the run was
    /// exhausted without meeting the convergence criterion.
    pub iterations: u32,
    pub converged: bool,
    /// Average relative change measured on the last iteration, in percent.
    /// Reported as measured even when the last iteration still discovered
    /// new tokens (capped runs), never replaced by a sentinel.
    pub final_convergence_percent: f64,
}

impl PriceEngine {
    pub fn new(anchor_token: impl Into<String>, max_iterations: u32, tolerance: f64) -> Self {
        Self {
            anchor_token: anchor_token.into().to_lowercase(),
            max_iterations,
            tolerance,
        }
    }

    pub fn with_defaults(anchor_token: impl Into<String>) -> Self {
        Self::new(anchor_token, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)
    }

    /// Run price discovery over one pool snapshot.
    ///
    /// Fails fast when the anchor price is unusable — no computation is
    /// meaningful without it, and falling back to a stale or zero value
    /// would poison every derived price. An empty snapshot is not an error:
    /// the run terminates at iteration 0 with the seed set.
    pub fn run(
        &self,
        pools: &[Pool],
        anchor_price_usd: f64,
        prior_prices: &PriceMap,
    ) -> Result<PriceRun> {
        if !anchor_price_usd.is_finite() || anchor_price_usd <= 0.0 {
            bail!(
                "no usable anchor price for {}: got {}",
                self.anchor_token,
                anchor_price_usd
            );
        }

        // Seed: carried-forward history first, the anchor last so it always
        // wins. Degenerate history entries are dropped up front.
        let mut prices = PriceMap::default();
        for (token, &price) in prior_prices {
            if price.is_finite() && price > 0.0 {
                prices.insert(token.to_lowercase(), price);
            }
        }
        prices.insert(self.anchor_token.clone(), anchor_price_usd);

        let seeded = prices.len();

        let mut iterations = 0u32;
        let mut converged = pools.is_empty();
        let mut last_change = 0.0f64;

        while !converged && iterations < self.max_iterations {
            iterations += 1;

            let contributions: Vec<_> = pools
                .iter()
                .filter_map(|pool| pool_contribution(pool, &prices, &self.anchor_token))
                .collect();
            let derived = aggregate_contributions(&contributions);

            let previous = prices.clone();
            for (token, price) in derived {
                // The anchor is seeded externally and immutable for the run.
                if token != self.anchor_token {
                    prices.insert(token, price);
                }
            }

            let report = measure(&previous, &prices, self.tolerance);
            last_change = report.average_relative_change;
            let discovered = prices.len() - previous.len();

            debug!(
                "iteration {}: {} tokens ({} new), {:.6}% average change",
                iterations,
                prices.len(),
                discovered,
                last_change * 100.0
            );

            // A newly discovered token needs one more pass to propagate its
            // price to neighbors, however small the measured change is.
            if discovered == 0 && report.converged {
                converged = true;
            }
        }

        let final_prices = self.finalize(prices, anchor_price_usd);

        info!(
            "price discovery: {} seeded -> {} priced tokens, {} iterations, converged={}",
            seeded,
            final_prices.len(),
            iterations,
            converged
        );

        Ok(PriceRun {
            prices: final_prices,
            anchor_price_usd,
            iterations,
            converged,
            final_convergence_percent: last_change * 100.0,
        })
    }

    /// Drop tokens whose final USD or anchor-relative price is degenerate.
    /// Those come from pool-graph dead ends (every contributing pool skipped)
    /// and must not be persisted as valid prices.
    ///
    /// The sanity bounds apply to derived tokens only. The anchor price is
    /// externally authoritative and already validated at seed time; it is
    /// always part of the result, whatever the caps say.
    fn finalize(&self, prices: PriceMap, anchor_price_usd: f64) -> PriceMap {
        let mut valid = PriceMap::default();

        for (token, price) in prices {
            if token != self.anchor_token {
                if validate_usd_price(price) <= 0.0 {
                    continue;
                }
                if validate_usd_price_vs_anchor(price, anchor_price_usd) <= 0.0 {
                    continue;
                }
            }
            let anchor_relative = price / anchor_price_usd;
            if !anchor_relative.is_finite() || anchor_relative <= 0.0 {
                continue;
            }
            valid.insert(token, price);
        }

        valid
    }
}
