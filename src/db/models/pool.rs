use serde::Serialize;

use crate::utils::str_to_f64_with_decimals;

/// One constant-product liquidity pool from the snapshot (PostgreSQL).
///
/// Pools are read-only for the duration of a run: the snapshot is loaded
/// once and never mutated. Raw reserves are kept as numeric strings because
/// atomic-unit balances routinely exceed 2^53; decimal adjustment happens
/// through BigDecimal on access.
#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    pub address: String,

    // Token legs (denormalized)
    pub token0: String,
    pub token1: String,
    pub token0_decimals: u8,
    pub token1_decimals: u8,

    // Raw reserves in atomic units
    pub reserve0: String,
    pub reserve1: String,
}

impl Pool {
    pub fn new(
        address: impl Into<String>,
        token0: impl Into<String>,
        reserve0: impl Into<String>,
        token0_decimals: u8,
        token1: impl Into<String>,
        reserve1: impl Into<String>,
        token1_decimals: u8,
    ) -> Self {
        Self {
            address: address.into(),
            token0: token0.into(),
            token1: token1.into(),
            token0_decimals,
            token1_decimals,
            reserve0: reserve0.into(),
            reserve1: reserve1.into(),
        }
    }

    /// Token0 reserve adjusted for decimals. None if the raw value is unparseable.
    pub fn reserve0_adjusted(&self) -> Option<f64> {
        str_to_f64_with_decimals(&self.reserve0, self.token0_decimals)
    }

    /// Token1 reserve adjusted for decimals. None if the raw value is unparseable.
    pub fn reserve1_adjusted(&self) -> Option<f64> {
        str_to_f64_with_decimals(&self.reserve1, self.token1_decimals)
    }
}
