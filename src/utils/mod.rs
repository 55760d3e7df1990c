//! Utility functions for the Fathom pricing job.
//!
//! - [`conversion`] - BigDecimal-backed raw-amount parsing and decimal adjustment
//! - [`validation`] - Price and TVL sanity bounds

mod conversion;
mod validation;

pub use conversion::str_to_f64_with_decimals;

pub use validation::{
    validate_price_ratio, validate_usd_price, validate_usd_price_vs_anchor, validate_usd_tvl,
    MAX_ANCHOR_MULTIPLIER, MAX_PRICE_RATIO, MAX_TOKEN_USD_PRICE, MAX_TVL_USD,
};
