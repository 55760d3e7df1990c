use anyhow::{bail, Context};
use log::error;
use rustc_hash::FxHashMap;

use crate::db::models::{Pool, TokenPrice};
use crate::db::postgres::PostgresClient;

impl PostgresClient {
    // ==================== POOL SNAPSHOT ====================

    /// Load the immutable pool snapshot for this run.
    ///
    /// Only constant-product pools take part in price inference; other pool
    /// types are excluded at the query. Ordering by address keeps the
    /// contribution sequence, and with it the run output, deterministic.
    pub async fn get_pool_snapshot(&self) -> anyhow::Result<Vec<Pool>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT
                address, token0, token1, token0_decimals, token1_decimals,
                reserve0, reserve1
            FROM pricing.pools
            WHERE pool_type = 'constant_product'
            ORDER BY address
        "#;

        let rows = client.query(query, &[]).await?;
        let pools = rows
            .iter()
            .map(|row| {
                // Lowercase all address fields for consistent comparisons
                let address: String = row.get("address");
                let token0: String = row.get("token0");
                let token1: String = row.get("token1");
                let token0_decimals: i16 = row.get("token0_decimals");
                let token1_decimals: i16 = row.get("token1_decimals");

                Pool {
                    address: address.to_lowercase(),
                    token0: token0.to_lowercase(),
                    token1: token1.to_lowercase(),
                    token0_decimals: token0_decimals as u8,
                    token1_decimals: token1_decimals as u8,
                    reserve0: row.get("reserve0"),
                    reserve1: row.get("reserve1"),
                }
            })
            .collect();

        Ok(pools)
    }

    // ==================== ANCHOR PRICE ====================

    /// Read the anchor token's current USD price from the oracle table.
    ///
    /// Fails when no usable price exists. No fallback to stale or zero
    /// values: a run without an anchor produces nothing.
    pub async fn get_anchor_price(&self, anchor_token: &str) -> anyhow::Result<f64> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT usd_price
            FROM pricing.anchor_price
            WHERE token_address = $1
            ORDER BY updated_at DESC
            LIMIT 1
        "#;

        let row = client
            .query_opt(query, &[&anchor_token.to_lowercase()])
            .await
            .context("Failed to query anchor price")?;

        let Some(row) = row else {
            bail!("no anchor price recorded for {}", anchor_token);
        };

        let usd_price: f64 = row.get("usd_price");
        if !usd_price.is_finite() || usd_price <= 0.0 {
            bail!(
                "anchor price for {} is unusable: {}",
                anchor_token,
                usd_price
            );
        }

        Ok(usd_price)
    }

    // ==================== PRICE HISTORY ====================

    /// Load the most recently persisted price per token.
    ///
    /// Used to seed carry-forward prices for tokens not re-derived in the
    /// current run. The anchor entry, if present, is overridden at seed time.
    pub async fn get_latest_prices(&self) -> anyhow::Result<FxHashMap<String, f64>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT token_address, usd_price
            FROM pricing.token_prices
            WHERE usd_price > 0
        "#;

        let rows = client.query(query, &[]).await?;
        let mut prices = FxHashMap::default();
        for row in &rows {
            let token_address: String = row.get("token_address");
            let usd_price: f64 = row.get("usd_price");
            prices.insert(token_address.to_lowercase(), usd_price);
        }

        Ok(prices)
    }

    /// Upsert the final price set into the latest-price table.
    ///
    /// Returns the number of rows written. Per-row failures are logged and
    /// skipped so one bad row cannot lose the rest of the run.
    pub async fn upsert_token_prices(&self, prices: &[TokenPrice]) -> anyhow::Result<usize> {
        let client = self.pool.get().await?;

        let stmt = client
            .prepare(
                r#"
            INSERT INTO pricing.token_prices (token_address, usd_price, anchor_relative_price, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_address) DO UPDATE SET
                usd_price = EXCLUDED.usd_price,
                anchor_relative_price = EXCLUDED.anchor_relative_price,
                updated_at = EXCLUDED.updated_at
            "#,
            )
            .await?;

        let mut written = 0;
        for price in prices {
            let result = client
                .execute(
                    &stmt,
                    &[
                        &price.token_address,
                        &price.usd_price,
                        &price.anchor_relative_price,
                        &price.updated_at,
                    ],
                )
                .await;

            match result {
                Ok(_) => written += 1,
                Err(e) => error!("Failed to upsert price for {}: {:?}", price.token_address, e),
            }
        }

        Ok(written)
    }
}
