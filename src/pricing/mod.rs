//! TVL-weighted token price discovery.
//!
//! Exactly one token (the anchor) has a trusted external USD price; every
//! other price is inferred transitively from constant-product pool reserve
//! ratios, weighted by pool liquidity and propagated one hop per iteration
//! until the set stabilizes.
//!
//! The module is pure: it operates on an immutable pool snapshot and plain
//! price maps, with no knowledge of where either comes from.

mod aggregator;
mod convergence;
mod engine;
mod tvl;

pub use aggregator::aggregate_contributions;
pub use convergence::{measure, ConvergenceReport};
pub use engine::{PriceEngine, PriceRun, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use tvl::{pool_contribution, PoolContribution};

/// Working price table: token address → USD price.
///
/// FxHashMap keeps lookups cheap and, because FxHasher carries no random
/// state, iteration order is reproducible across runs with identical inputs.
pub type PriceMap = rustc_hash::FxHashMap<String, f64>;
