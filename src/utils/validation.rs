//! Price validation constants and helper functions.
//!
//! These bounds catch calculation errors (decimal mismatches, inverted
//! ratios) while allowing legitimate extreme values:
//!
//! 1. TOKEN PRICE: no token in an anchor-denominated ecosystem legitimately
//!    costs more than $1M per unit; anything above is a calculation error.
//!
//! 2. RESERVE RATIO: the ratio between two pool legs can be extreme, but
//!    ratios beyond 1e12 usually indicate decimal/conversion errors.
//!
//! 3. ANCHOR MULTIPLIER: the anchor is the most valuable asset in the
//!    ecosystem by a wide margin. A derived token priced at more than 100x
//!    the anchor almost certainly came from an inverted ratio.

/// Maximum reasonable reserve ratio between two pool legs.
pub const MAX_PRICE_RATIO: f64 = 1e12;

/// Minimum reasonable ratio. Inverse of MAX_PRICE_RATIO.
pub const MIN_PRICE_RATIO: f64 = 1e-12;

/// Maximum reasonable token price in USD.
pub const MAX_TOKEN_USD_PRICE: f64 = 1e6;

/// Maximum reasonable TVL in USD for a single pool.
pub const MAX_TVL_USD: f64 = 1e11;

/// Maximum multiplier of the anchor price for any derived token.
/// Catches inversion errors where a ratio is used instead of its reciprocal.
pub const MAX_ANCHOR_MULTIPLIER: f64 = 1e2;

/// Validate a leg-to-leg reserve ratio is within reasonable bounds.
/// Returns Some(ratio) if valid, None if invalid.
#[inline]
pub fn validate_price_ratio(ratio: f64) -> Option<f64> {
    if ratio > 0.0 && ratio.is_finite() && ratio >= MIN_PRICE_RATIO && ratio <= MAX_PRICE_RATIO {
        Some(ratio)
    } else {
        None
    }
}

/// Validate a USD price is within reasonable bounds.
/// Returns the price if valid, 0.0 if invalid.
#[inline]
pub fn validate_usd_price(price: f64) -> f64 {
    if price > 0.0 && price.is_finite() && price <= MAX_TOKEN_USD_PRICE {
        price
    } else {
        0.0
    }
}

/// Validate a USD TVL is within reasonable bounds.
/// Returns the TVL if valid, 0.0 if invalid.
#[inline]
pub fn validate_usd_tvl(tvl: f64) -> f64 {
    if tvl >= 0.0 && tvl.is_finite() && tvl <= MAX_TVL_USD {
        tvl
    } else {
        0.0
    }
}

/// Validate a token's USD price relative to the anchor price.
///
/// # Arguments
/// * `token_usd` - The derived USD price of the token
/// * `anchor_price_usd` - The current USD price of the anchor token
///
/// # Returns
/// * The price if plausible, 0.0 if it exceeds reasonable bounds relative to
///   the anchor
#[inline]
pub fn validate_usd_price_vs_anchor(token_usd: f64, anchor_price_usd: f64) -> f64 {
    if token_usd <= 0.0 || !token_usd.is_finite() {
        return 0.0;
    }

    if token_usd > MAX_TOKEN_USD_PRICE {
        return 0.0;
    }

    if anchor_price_usd > 0.0 {
        let multiplier = token_usd / anchor_price_usd;
        if multiplier > MAX_ANCHOR_MULTIPLIER {
            return 0.0;
        }
    }

    token_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_price_bounds() {
        assert_eq!(validate_usd_price(2.0), 2.0);
        assert_eq!(validate_usd_price(0.0), 0.0);
        assert_eq!(validate_usd_price(-1.0), 0.0);
        assert_eq!(validate_usd_price(f64::NAN), 0.0);
        assert_eq!(validate_usd_price(f64::INFINITY), 0.0);
        assert_eq!(validate_usd_price(MAX_TOKEN_USD_PRICE * 2.0), 0.0);
    }

    #[test]
    fn test_anchor_relative_bound() {
        // A token "worth" 1e9 with a $100k anchor is an inversion error
        assert_eq!(validate_usd_price_vs_anchor(1e9, 100_000.0), 0.0);
        assert_eq!(validate_usd_price_vs_anchor(250_000.0, 100_000.0), 250_000.0);
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(validate_price_ratio(50_000.0), Some(50_000.0));
        assert_eq!(validate_price_ratio(0.0), None);
        assert_eq!(validate_price_ratio(1e15), None);
    }
}
