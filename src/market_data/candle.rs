// =============================================================================
// Candles and OHLC series
// =============================================================================

use serde::{Deserialize, Serialize};

/// A single OHLCV candle as returned by the klines endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub close_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        close_time: i64,
    ) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Index-aligned high / low / close columns, oldest first.
///
/// `high[i] >= low[i]` is not checked; validating candles is the job of
/// whoever ingests them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcSeries {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl OhlcSeries {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut series = Self {
            high: Vec::with_capacity(candles.len()),
            low: Vec::with_capacity(candles.len()),
            close: Vec::with_capacity(candles.len()),
        };
        for c in candles {
            series.high.push(c.high);
            series.low.push(c.low);
            series.close.push(c.close);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// 24h ticker figures for one symbol, as used to rank the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub symbol: String,
    pub last_price: f64,
    pub price_change_pct: f64,
    pub quote_volume: f64,
}
