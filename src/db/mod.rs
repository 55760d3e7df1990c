use std::sync::Arc;

use crate::config::Settings;

pub mod clickhouse;
pub mod models;
pub mod postgres;

pub use clickhouse::ClickhouseClient;
pub use postgres::PostgresClient;

/// Combined database client managing ClickHouse and PostgreSQL connections.
///
/// PostgreSQL is the relational side (pool snapshot, anchor price, latest
/// prices). ClickHouse is the time-series side (append-only price history
/// with run diagnostics).
#[derive(Clone)]
pub struct Database {
    pub clickhouse: Arc<ClickhouseClient>,
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    pub async fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let clickhouse = ClickhouseClient::new(settings.clickhouse.clone()).await?;
        let postgres = PostgresClient::new(settings.postgres.clone()).await?;

        // Schemas are idempotent; applying them on every start keeps a fresh
        // deployment and an upgraded one on the same path.
        clickhouse.migrate().await?;
        postgres.migrate().await?;

        Ok(Self {
            clickhouse: Arc::new(clickhouse),
            postgres: Arc::new(postgres),
        })
    }
}
