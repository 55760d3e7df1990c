use anyhow::Context;
use log::info;

use crate::db::clickhouse::ClickhouseClient;
use crate::db::models::PriceSnapshot;

impl ClickhouseClient {
    /// Append one run's price set to the history table.
    ///
    /// Every run writes a fresh timestamped batch; existing rows are never
    /// touched, which keeps the history auditable.
    pub async fn insert_price_snapshots(
        &self,
        snapshots: &[PriceSnapshot],
    ) -> anyhow::Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }

        let mut insert = self
            .client
            .insert::<PriceSnapshot>("price_snapshots")
            .await
            .context("Failed to open price_snapshots insert")?;

        for snapshot in snapshots {
            insert
                .write(snapshot)
                .await
                .with_context(|| {
                    format!("Failed to write snapshot for {}", snapshot.token_address)
                })?;
        }

        insert
            .end()
            .await
            .context("Failed to commit price snapshots")?;

        info!("Appended {} price snapshots to history", snapshots.len());
        Ok(())
    }
}
