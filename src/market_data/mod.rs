pub mod candle;
pub mod source;

// Re-export for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{Candle, OhlcSeries, TickerSummary};
pub use source::MarketDataSource;
