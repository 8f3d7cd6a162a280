// =============================================================================
// Market-data source seam
// =============================================================================
//
// The heatmap service only needs two things from an exchange: a volume-ranked
// universe and closed candles per symbol.  `BinanceClient` implements this in
// production; tests plug in an in-memory source.

use anyhow::Result;
use async_trait::async_trait;

use crate::market_data::candle::{Candle, TickerSummary};

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Up to `limit` actively trading symbols quoted in `quote_asset`,
    /// highest quote volume first.
    async fn top_symbols(&self, limit: usize, quote_asset: &str) -> Result<Vec<TickerSummary>>;

    /// The most recent `limit` candles for `symbol` at `interval`, oldest
    /// first.  The last candle may still be in progress.
    async fn klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>>;
}
