//! Numeric conversion utilities.
//!
//! Raw reserve amounts come out of the warehouse as numeric strings because
//! atomic token units routinely exceed 2^53. Parsing goes through BigDecimal
//! so the decimal adjustment happens before any precision is lost to f64.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;
use std::str::FromStr;

/// Parse a string representation of a large number to f64 with decimal adjustment.
///
/// # Arguments
/// * `value_str` - The string representation of the number
/// * `decimals` - The number of decimal places to adjust by
///
/// # Returns
/// * `Some(f64)` if parsing succeeds and the value is finite and non-negative,
///   `None` otherwise
pub fn str_to_f64_with_decimals(value_str: &str, decimals: u8) -> Option<f64> {
    let big_value = BigDecimal::from_str(value_str).ok()?;

    let adjusted = big_value / big_pow10(decimals);

    let result = adjusted.to_f64()?;

    if result.is_finite() && result >= 0.0 {
        Some(result)
    } else {
        None
    }
}

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_adjustment() {
        // 1 anchor unit in 8-decimal atomic units
        assert_eq!(str_to_f64_with_decimals("100000000", 8), Some(1.0));
        assert_eq!(str_to_f64_with_decimals("50000000000", 6), Some(50_000.0));
        assert_eq!(str_to_f64_with_decimals("0", 8), Some(0.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(str_to_f64_with_decimals("not-a-number", 8), None);
        assert_eq!(str_to_f64_with_decimals("-1000", 8), None);
    }

    #[test]
    fn test_reserve_beyond_f64_mantissa() {
        // 2^64 atomic units at 18 decimals stays precise through BigDecimal
        let value = str_to_f64_with_decimals("18446744073709551616", 18).unwrap();
        assert!((value - 18.446744073709551616).abs() < 1e-9);
    }
}
