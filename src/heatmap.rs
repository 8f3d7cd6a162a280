// =============================================================================
// Heatmap Service — volume-ranked universe scored by the signal classifier
// =============================================================================
//
// One scan:
//   1. rank the universe by 24h quote volume (`top_symbols`)
//   2. fetch candles for every symbol, at most `max_concurrent_fetches` in
//      flight, results kept in ranking order
//   3. compute indicators + signal layers per symbol
//
// A symbol whose candles cannot be fetched is logged and dropped; a failed or
// empty universe turns the whole response into `success: false`.
// =============================================================================

use std::collections::BTreeMap;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::cross_retest::{check_ema_cross_retest, DEFAULT_CROSS_LOOKBACK};
use crate::indicators::rsi::{rsi_category, RsiCategory};
use crate::market_data::{Candle, MarketDataSource, OhlcSeries, TickerSummary};
use crate::runtime_config::RuntimeConfig;
use crate::signals::{detect_signal_layer, LayerIndicators, LayerParams, SignalLabel};
use crate::types::Timeframe;

// =============================================================================
// Response types
// =============================================================================

/// One heatmap cell.
///
/// Indicator values are read at the bar the classifier scores (the last
/// closed candle).  Values that have not warmed up serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSignal {
    pub symbol: String,
    /// Base asset, e.g. `BTC` for `BTCUSDT`.
    pub full_name: String,
    pub price: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub rsi: Option<f64>,
    pub rsi_smoothed: Option<f64>,
    pub rsi_category: RsiCategory,
    pub ema_13: Option<f64>,
    pub ema_21: Option<f64>,
    pub atr: Option<f64>,
    pub long_layer: u8,
    pub short_layer: u8,
    pub long_signal: Option<SignalLabel>,
    pub short_signal: Option<SignalLabel>,
    /// EMA13/EMA21 cross with a retest of EMA13 in the last closed bars.
    pub ema_cross_long: bool,
    pub ema_cross_short: bool,
}

impl CoinSignal {
    /// Score one symbol from its ticker and candles (oldest first).
    pub fn evaluate(
        ticker: &TickerSummary,
        quote_asset: &str,
        candles: &[Candle],
        params: &LayerParams,
    ) -> Self {
        let series = OhlcSeries::from_candles(candles);
        let indicators = LayerIndicators::compute(&series);
        let result = detect_signal_layer(&indicators.inputs(&series), params);

        let at = series.len().saturating_sub(2);
        let rsi = finite(&indicators.rsi, at);

        let closed = series.len().saturating_sub(1);
        let cross = check_ema_cross_retest(
            &series.close[..closed],
            &indicators.ema13[..closed],
            &indicators.ema21[..closed],
            DEFAULT_CROSS_LOOKBACK,
        );

        Self {
            symbol: ticker.symbol.clone(),
            full_name: base_asset(&ticker.symbol, quote_asset).to_string(),
            price: ticker.last_price,
            price_change_24h: ticker.price_change_pct,
            volume_24h: ticker.quote_volume,
            rsi,
            rsi_smoothed: finite(&indicators.smoothed_rsi, at),
            rsi_category: rsi_category(rsi.unwrap_or(f64::NAN)),
            ema_13: finite(&indicators.ema13, at),
            ema_21: finite(&indicators.ema21, at),
            atr: finite(&indicators.atr, at),
            long_layer: result.long_layer,
            short_layer: result.short_layer,
            long_signal: result.long_signal,
            short_signal: result.short_signal,
            ema_cross_long: cross.long_setup,
            ema_cross_short: cross.short_setup,
        }
    }
}

/// Payload of `GET /api/heatmap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    pub success: bool,
    pub timeframe: Timeframe,
    pub signals: Vec<CoinSignal>,
    pub total_coins: usize,
    /// RFC 3339 UTC timestamp of the scan.
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HeatmapResponse {
    pub fn failed(timeframe: Timeframe, error: impl Into<String>) -> Self {
        Self {
            success: false,
            timeframe,
            signals: Vec::new(),
            total_coins: 0,
            updated_at: Utc::now().to_rfc3339(),
            error: Some(error.into()),
        }
    }
}

/// Aggregate counts over one heatmap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStats {
    pub total_coins: usize,
    /// Coins with `long_layer > 0`.
    pub long_signals: usize,
    pub short_signals: usize,
    /// Coins at layer 5.
    pub strong_long: usize,
    pub strong_short: usize,
    pub overbought: usize,
    pub oversold: usize,
    /// `"long_1"` … `"long_5"`, `"short_1"` … `"short_5"`; each key present.
    pub by_layer: BTreeMap<String, usize>,
}

// =============================================================================
// Service
// =============================================================================

/// Scan the top `limit` symbols on `timeframe`.  Never fails: upstream errors
/// are reported inside the response.
pub async fn build_heatmap(
    source: &dyn MarketDataSource,
    limit: usize,
    timeframe: Timeframe,
    config: &RuntimeConfig,
) -> HeatmapResponse {
    let tickers = match source.top_symbols(limit, &config.quote_asset).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, %timeframe, "failed to rank symbol universe");
            return HeatmapResponse::failed(timeframe, format!("{e:#}"));
        }
    };

    if tickers.is_empty() {
        warn!(%timeframe, "symbol universe is empty");
        return HeatmapResponse::failed(timeframe, "no symbols available");
    }

    let interval = timeframe.as_interval();
    let klines_limit = config.klines_limit;
    let concurrency = config.max_concurrent_fetches.max(1);

    let fetched: Vec<(TickerSummary, anyhow::Result<Vec<Candle>>)> = stream::iter(tickers)
        .map(|ticker| async move {
            let candles = source.klines(&ticker.symbol, interval, klines_limit).await;
            (ticker, candles)
        })
        .buffered(concurrency)
        .collect()
        .await;

    let mut signals = Vec::with_capacity(fetched.len());
    for (ticker, candles) in fetched {
        match candles {
            Ok(c) if c.is_empty() => {
                warn!(symbol = %ticker.symbol, "no candles returned, skipping");
            }
            Ok(c) => signals.push(CoinSignal::evaluate(
                &ticker,
                &config.quote_asset,
                &c,
                &config.layer_params,
            )),
            Err(e) => {
                warn!(symbol = %ticker.symbol, error = %e, "klines fetch failed, skipping");
            }
        }
    }

    info!(
        %timeframe,
        requested = limit,
        count = signals.len(),
        "heatmap built"
    );

    HeatmapResponse {
        success: true,
        timeframe,
        total_coins: signals.len(),
        signals,
        updated_at: Utc::now().to_rfc3339(),
        error: None,
    }
}

/// Count signals in `heatmap`.
pub fn summarize(heatmap: &HeatmapResponse) -> SignalStats {
    let mut stats = SignalStats {
        total_coins: heatmap.signals.len(),
        ..SignalStats::default()
    };
    for layer in 1..=5 {
        stats.by_layer.insert(format!("long_{layer}"), 0);
        stats.by_layer.insert(format!("short_{layer}"), 0);
    }

    for coin in &heatmap.signals {
        if coin.long_layer > 0 {
            stats.long_signals += 1;
            *stats.by_layer.entry(format!("long_{}", coin.long_layer)).or_default() += 1;
        }
        if coin.short_layer > 0 {
            stats.short_signals += 1;
            *stats.by_layer.entry(format!("short_{}", coin.short_layer)).or_default() += 1;
        }
        if coin.long_layer == 5 {
            stats.strong_long += 1;
        }
        if coin.short_layer == 5 {
            stats.strong_short += 1;
        }
        match coin.rsi_category {
            RsiCategory::Overbought => stats.overbought += 1,
            RsiCategory::Oversold => stats.oversold += 1,
            _ => {}
        }
    }

    stats
}

fn finite(series: &[f64], i: usize) -> Option<f64> {
    series.get(i).copied().filter(|v| v.is_finite())
}

fn base_asset<'a>(symbol: &'a str, quote_asset: &str) -> &'a str {
    symbol.strip_suffix(quote_asset).unwrap_or(symbol)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::source::fake::{wave, FakeSource};

    fn coin(long_layer: u8, short_layer: u8, category: RsiCategory) -> CoinSignal {
        CoinSignal {
            symbol: "XUSDT".to_string(),
            full_name: "X".to_string(),
            price: 1.0,
            price_change_24h: 0.0,
            volume_24h: 1.0,
            rsi: Some(50.0),
            rsi_smoothed: Some(50.0),
            rsi_category: category,
            ema_13: None,
            ema_21: None,
            atr: None,
            long_layer,
            short_layer,
            long_signal: SignalLabel::for_long(long_layer),
            short_signal: SignalLabel::for_short(short_layer),
            ema_cross_long: false,
            ema_cross_short: false,
        }
    }

    fn heatmap(signals: Vec<CoinSignal>) -> HeatmapResponse {
        HeatmapResponse {
            success: true,
            timeframe: Timeframe::H4,
            total_coins: signals.len(),
            signals,
            updated_at: String::new(),
            error: None,
        }
    }

    // ---- build_heatmap ---------------------------------------------------

    #[tokio::test]
    async fn builds_in_volume_order() {
        let source = FakeSource::with_symbols(&["BTCUSDT", "ETHUSDT", "SOLUSDT"], 100);
        let resp = build_heatmap(&source, 10, Timeframe::H1, &RuntimeConfig::default()).await;

        assert!(resp.success);
        assert_eq!(resp.timeframe, Timeframe::H1);
        assert_eq!(resp.total_coins, 3);
        let symbols: Vec<&str> = resp.signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
        assert_eq!(resp.signals[0].full_name, "BTC");
        assert!(resp.signals[0].rsi.is_some());
        assert!(resp.signals[0].ema_21.is_some());
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn respects_limit() {
        let source = FakeSource::with_symbols(&["BTCUSDT", "ETHUSDT", "SOLUSDT"], 100);
        let resp = build_heatmap(&source, 2, Timeframe::H4, &RuntimeConfig::default()).await;
        assert_eq!(resp.total_coins, 2);
    }

    #[tokio::test]
    async fn universe_follows_configured_quote_asset() {
        let source = FakeSource::with_symbols(&["BTCUSDT", "BTCFDUSD", "ETHFDUSD"], 100);
        let mut config = RuntimeConfig::default();
        config.quote_asset = "FDUSD".to_string();
        let resp = build_heatmap(&source, 10, Timeframe::H4, &config).await;

        let symbols: Vec<&str> = resp.signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCFDUSD", "ETHFDUSD"]);
        assert_eq!(resp.signals[0].full_name, "BTC");
    }

    #[tokio::test]
    async fn failing_symbol_is_skipped() {
        let mut source = FakeSource::with_symbols(&["BTCUSDT", "ETHUSDT"], 100);
        source.candles.remove("ETHUSDT");
        let resp = build_heatmap(&source, 10, Timeframe::H4, &RuntimeConfig::default()).await;
        assert!(resp.success);
        assert_eq!(resp.total_coins, 1);
        assert_eq!(resp.signals[0].symbol, "BTCUSDT");
    }

    #[tokio::test]
    async fn short_history_scores_zero() {
        let mut source = FakeSource::with_symbols(&["NEWUSDT"], 100);
        source.candles.insert("NEWUSDT".to_string(), wave(20));
        let resp = build_heatmap(&source, 10, Timeframe::H4, &RuntimeConfig::default()).await;
        assert_eq!(resp.total_coins, 1);
        let coin = &resp.signals[0];
        assert_eq!((coin.long_layer, coin.short_layer), (0, 0));
        assert!(coin.ema_21.is_none());
        assert!(coin.long_signal.is_none());
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let resp = build_heatmap(&FakeSource::failing(), 10, Timeframe::H4, &RuntimeConfig::default()).await;
        assert!(!resp.success);
        assert!(resp.signals.is_empty());
        assert!(resp.error.unwrap().contains("418"));
    }

    #[tokio::test]
    async fn empty_universe_is_a_failure() {
        let resp = build_heatmap(&FakeSource::default(), 10, Timeframe::D1, &RuntimeConfig::default()).await;
        assert!(!resp.success);
        assert_eq!(resp.timeframe, Timeframe::D1);
    }

    // ---- CoinSignal ------------------------------------------------------

    #[test]
    fn non_finite_values_serialise_as_null() {
        let ticker = TickerSummary {
            symbol: "BTCUSDT".to_string(),
            last_price: 1.0,
            price_change_pct: 0.0,
            quote_volume: 1.0,
        };
        let cs = CoinSignal::evaluate(&ticker, "USDT", &wave(5), &LayerParams::default());
        let json = serde_json::to_value(&cs).unwrap();
        assert!(json["rsi"].is_null());
        assert!(json["ema_13"].is_null());
        assert_eq!(json["rsi_category"], "NEUTRAL");
        assert_eq!(json["long_layer"], 0);
        assert_eq!(json["ema_cross_long"], false);
    }

    #[test]
    fn empty_candles_do_not_panic() {
        let ticker = TickerSummary {
            symbol: "BTCUSDT".to_string(),
            last_price: 1.0,
            price_change_pct: 0.0,
            quote_volume: 1.0,
        };
        let cs = CoinSignal::evaluate(&ticker, "USDT", &[], &LayerParams::default());
        assert!(cs.rsi.is_none());
        assert_eq!(cs.long_layer, 0);
    }

    #[test]
    fn base_asset_strips_quote() {
        assert_eq!(base_asset("BTCUSDT", "USDT"), "BTC");
        assert_eq!(base_asset("ETHBTC", "USDT"), "ETHBTC");
    }

    // ---- summarize -------------------------------------------------------

    #[test]
    fn summarize_counts_layers() {
        let hm = heatmap(vec![
            coin(5, 0, RsiCategory::Oversold),
            coin(4, 0, RsiCategory::Weak),
            coin(0, 3, RsiCategory::Overbought),
            coin(0, 5, RsiCategory::Overbought),
            coin(0, 0, RsiCategory::Neutral),
        ]);
        let stats = summarize(&hm);
        assert_eq!(stats.total_coins, 5);
        assert_eq!(stats.long_signals, 2);
        assert_eq!(stats.short_signals, 2);
        assert_eq!(stats.strong_long, 1);
        assert_eq!(stats.strong_short, 1);
        assert_eq!(stats.overbought, 2);
        assert_eq!(stats.oversold, 1);
        assert_eq!(stats.by_layer["long_5"], 1);
        assert_eq!(stats.by_layer["long_4"], 1);
        assert_eq!(stats.by_layer["short_3"], 1);
        assert_eq!(stats.by_layer["long_1"], 0);
        assert_eq!(stats.by_layer.len(), 10);
    }

    #[test]
    fn summarize_failed_heatmap_is_empty() {
        let stats = summarize(&HeatmapResponse::failed(Timeframe::H4, "boom"));
        assert_eq!(stats.total_coins, 0);
        assert_eq!(stats.long_signals, 0);
    }

    #[test]
    fn failed_response_serialises_error() {
        let json = serde_json::to_value(HeatmapResponse::failed(Timeframe::H4, "boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["timeframe"], "4h");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["signals"].as_array().unwrap().len(), 0);
    }
}
