mod config;

pub use config::{ClickHouseSettings, PostgresSettings, PricingSettings, Settings};
