mod pool;
mod price_snapshot;
mod token_price;

pub use pool::Pool;
pub use price_snapshot::PriceSnapshot;
pub use token_price::TokenPrice;
