use clickhouse::Row;
use serde::Serialize;
use time::OffsetDateTime;

/// Append-only record of one token's price from one pricing run (ClickHouse).
///
/// Population: written once at the end of each run, one row per priced token
/// including the anchor. Rows are never updated in place; each run adds a new
/// timestamped batch.
///
/// Query Patterns:
///   - "Get price history for token X"
///   - "How many iterations did run Y need, and did it converge?"
#[derive(Debug, Clone, Serialize, Row)]
pub struct PriceSnapshot {
    pub token_address: String,
    pub usd_price: f64,
    /// `usd_price` divided by the anchor's USD price at calculation time.
    pub anchor_relative_price: f64,

    // Run diagnostics, identical across all rows of one run
    pub iterations_to_converge: u32,
    pub convergence_percent: f64,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub calculated_at: OffsetDateTime,
}

impl PriceSnapshot {
    pub fn new(
        token_address: String,
        usd_price: f64,
        anchor_price_usd: f64,
        iterations_to_converge: u32,
        convergence_percent: f64,
        calculated_at: OffsetDateTime,
    ) -> Self {
        Self {
            token_address,
            usd_price,
            anchor_relative_price: usd_price / anchor_price_usd,
            iterations_to_converge,
            convergence_percent,
            calculated_at,
        }
    }
}
