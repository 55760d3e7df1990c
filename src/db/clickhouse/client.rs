use anyhow::Context;
use clickhouse::Client;
use log::info;

use crate::config::ClickHouseSettings;

/// ClickHouse client for the append-only price history.
pub struct ClickhouseClient {
    pub client: Client,
}

impl ClickhouseClient {
    pub async fn new(settings: ClickHouseSettings) -> anyhow::Result<Self> {
        info!("Connecting to ClickHouse");

        let client = Client::default()
            .with_url(settings.url.clone())
            .with_user(settings.user.clone())
            .with_password(settings.password.clone())
            .with_database(settings.database.clone());

        // Test connection with retry logic
        let mut retries = 0;
        let max_retries = 3;
        #[allow(unused_assignments)]
        let mut last_error: Option<String> = None;

        loop {
            match client.query("SELECT 1").fetch_one::<u8>().await {
                Ok(_) => {
                    info!("Successfully connected to ClickHouse");
                    break;
                },
                Err(e) => {
                    let error_msg = e.to_string();
                    last_error = Some(error_msg.clone());
                    retries += 1;

                    if retries >= max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to ClickHouse after {} attempts: {}",
                            max_retries,
                            last_error.unwrap_or_else(|| "Unknown error".to_string())
                        ));
                    }

                    let delay = std::time::Duration::from_millis(100 * 2_u64.pow(retries));
                    log::warn!(
                        "Failed to connect to ClickHouse (attempt {}/{}), retrying in {:?}... Error: {}",
                        retries,
                        max_retries,
                        delay,
                        error_msg
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }

        Ok(Self {
            client,
        })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running ClickHouse migrations");
        let schema = tokio::fs::read_to_string("schema/clickhouse.sql")
            .await
            .context("Failed to read schema/clickhouse.sql")?;

        for statement in schema.split(';') {
            let stmt = statement.trim();
            if stmt.is_empty() {
                continue;
            }
            self.client
                .query(stmt)
                .execute()
                .await
                .with_context(|| format!("Failed to execute migration statement: {}", stmt))?;
        }

        info!("ClickHouse migrations completed successfully");
        Ok(())
    }

    /// Health check - verify connection is still alive
    pub async fn health_check(&self) -> anyhow::Result<()> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .context("ClickHouse health check failed")?;
        Ok(())
    }
}
