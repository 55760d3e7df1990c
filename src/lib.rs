pub mod config;
pub mod db;
pub mod pricing;
pub mod utils;

pub use config::Settings;
pub use db::Database;
pub use pricing::{PriceEngine, PriceRun};
