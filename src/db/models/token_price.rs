use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest inferred token price (PostgreSQL).
///
/// One row per token, overwritten at the end of each pricing run; the
/// auditable per-run history lives in ClickHouse (`PriceSnapshot`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPrice {
    pub token_address: String,
    pub usd_price: f64,
    /// `usd_price` divided by the anchor's USD price. Stored for audit and
    /// debugging; never read back into the computation.
    pub anchor_relative_price: f64,
    pub updated_at: DateTime<Utc>,
}

impl TokenPrice {
    pub fn new(token_address: String, usd_price: f64, anchor_price_usd: f64) -> Self {
        Self {
            token_address,
            usd_price,
            anchor_relative_price: usd_price / anchor_price_usd,
            updated_at: Utc::now(),
        }
    }
}
