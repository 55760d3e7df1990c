use config::{Config, ConfigError, File};
use serde::Deserialize;

/// ClickHouse warehouse connection configuration.
///
/// ClickHouse holds the append-only price history: one timestamped row per
/// token per run, never overwritten.
#[derive(Debug, Deserialize, Clone)]
pub struct ClickHouseSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// PostgreSQL database connection configuration.
///
/// PostgreSQL holds the relational side:
/// - The constant-product pool snapshot the ETL pipeline maintains
/// - The anchor token's oracle price
/// - The latest price per token, read by the dashboard
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

/// Pricing engine configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    /// Contract identifier of the anchor token. Its USD price comes from the
    /// external oracle and is never derived from pools.
    pub anchor_token: String,
    /// Hard cap on fixed-point iterations per run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Average relative price change (in percent) below which a run counts
    /// as converged.
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance_percent: f64,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_convergence_tolerance() -> f64 {
    0.1
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub clickhouse: ClickHouseSettings,
    pub postgres: PostgresSettings,
    pub pricing: PricingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
