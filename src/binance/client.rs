// =============================================================================
// Binance REST API Client — public market data
// =============================================================================
//
// Only unauthenticated endpoints are used (exchangeInfo, ticker/24hr, klines),
// served from the market-data mirror by default.  Every response refreshes
// the shared request-weight tracker; a request that would cross the weight
// ceiling fails fast instead of risking a 429 / IP ban.
//
// JSON parsing is split into free functions so it can be tested without a
// network.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::binance::rate_limit::RateLimitTracker;
use crate::market_data::{Candle, MarketDataSource, TickerSummary};

pub const DEFAULT_BASE_URL: &str = "https://data-api.binance.vision";

/// Request weights of the endpoints used here.
const EXCHANGE_INFO_WEIGHT: u32 = 20;
const TICKER_24H_ALL_WEIGHT: u32 = 80;
const KLINES_WEIGHT: u32 = 2;

/// Stablecoin pairs quoted in the same asset carry no signal.
const EXCLUDED_PREFIX: &str = "USDC";

/// Binance REST client for public market data.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    rate_limits: Arc<RateLimitTracker>,
}

impl BinanceClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `BinanceClient`.
    ///
    /// # Arguments
    /// * `base_url`    — API root without a trailing `/api/v3`.
    /// * `rate_limits` — tracker shared with whoever reports API usage.
    ///
    /// The base URL is fixed for the life of the client; the quote asset is
    /// passed per call so a config reload takes effect on the next scan.
    pub fn new(base_url: impl Into<String>, rate_limits: Arc<RateLimitTracker>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "BinanceClient initialised");

        Ok(Self {
            base_url,
            client,
            rate_limits,
        })
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// GET /api/v3/exchangeInfo → symbols currently `TRADING` against the
    /// quote asset.
    #[instrument(skip(self), name = "binance::exchange_info")]
    pub async fn trading_symbols(&self, quote_asset: &str) -> Result<HashSet<String>> {
        let body = self
            .get_json("/api/v3/exchangeInfo", EXCHANGE_INFO_WEIGHT)
            .await?;
        let symbols = trading_symbols(&body, quote_asset)?;
        debug!(count = symbols.len(), "trading symbols retrieved");
        Ok(symbols)
    }

    /// GET /api/v3/ticker/24hr for every symbol (raw JSON array).
    #[instrument(skip(self), name = "binance::ticker_24h_all")]
    pub async fn ticker_24h_all(&self) -> Result<Value> {
        self.get_json("/api/v3/ticker/24hr", TICKER_24H_ALL_WEIGHT)
            .await
    }

    /// GET /api/v3/klines.
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        let path = format!("/api/v3/klines?symbol={symbol}&interval={interval}&limit={limit}");
        let body = self.get_json(&path, KLINES_WEIGHT).await?;
        let candles = parse_klines(&body)?;
        debug!(symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    async fn get_json(&self, path_and_query: &str, weight: u32) -> Result<Value> {
        if !self.rate_limits.can_send_request(weight) {
            anyhow::bail!("request weight limit reached, refusing GET {path_and_query}");
        }

        let url = format!("{}{}", self.base_url, path_and_query);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {path_and_query} request failed"))?;

        self.rate_limits.update_from_headers(resp.headers());

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {path_and_query} response"))?;

        if !status.is_success() {
            anyhow::bail!("Binance GET {} returned {}: {}", path_and_query, status, body);
        }

        Ok(body)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn top_symbols(&self, limit: usize, quote_asset: &str) -> Result<Vec<TickerSummary>> {
        // exchangeInfo only tightens the filter; the suffix check still applies.
        let valid = match self.trading_symbols(quote_asset).await {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "exchangeInfo unavailable, falling back to suffix filter");
                HashSet::new()
            }
        };

        let tickers = self.ticker_24h_all().await?;
        let ranked = rank_tickers(&tickers, &valid, quote_asset, limit)?;
        debug!(requested = limit, count = ranked.len(), "universe ranked by volume");
        Ok(ranked)
    }

    async fn klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        self.get_klines(symbol, interval, limit).await
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Parse Binance's array-of-arrays klines payload.
///
/// Array indices:
///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
///   [6] closeTime, ...
///
/// Entries with fewer than 7 fields are skipped with a warning.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>> {
    let raw = body.as_array().context("klines response is not an array")?;

    let mut candles = Vec::with_capacity(raw.len());
    for entry in raw {
        let arr = entry.as_array().context("kline entry is not an array")?;

        if arr.len() < 7 {
            warn!("skipping malformed kline entry with {} elements", arr.len());
            continue;
        }

        let open_time = arr[0].as_i64().unwrap_or(0);
        let open = parse_str_f64(&arr[1])?;
        let high = parse_str_f64(&arr[2])?;
        let low = parse_str_f64(&arr[3])?;
        let close = parse_str_f64(&arr[4])?;
        let volume = parse_str_f64(&arr[5])?;
        let close_time = arr[6].as_i64().unwrap_or(0);

        candles.push(Candle::new(open_time, open, high, low, close, volume, close_time));
    }

    Ok(candles)
}

/// Symbols from an exchangeInfo payload with status `TRADING` and the given
/// quote suffix.
pub fn trading_symbols(body: &Value, quote_asset: &str) -> Result<HashSet<String>> {
    let symbols = body["symbols"]
        .as_array()
        .context("exchangeInfo response missing 'symbols' array")?;

    Ok(symbols
        .iter()
        .filter(|s| s["status"].as_str() == Some("TRADING"))
        .filter_map(|s| s["symbol"].as_str())
        .filter(|sym| sym.ends_with(quote_asset))
        .map(str::to_string)
        .collect())
}

/// Filter and rank a ticker/24hr payload.
///
/// A ticker is kept when its symbol ends with `quote_asset`, does not start
/// with `USDC`, has positive quote volume, and (if `valid` is non-empty) is in
/// `valid`.  Output is sorted by quote volume, highest first, and truncated to
/// `limit`.  Tickers with unparsable numbers are dropped.
pub fn rank_tickers(
    body: &Value,
    valid: &HashSet<String>,
    quote_asset: &str,
    limit: usize,
) -> Result<Vec<TickerSummary>> {
    let raw = body.as_array().context("ticker/24hr response is not an array")?;

    let mut tickers: Vec<TickerSummary> = raw
        .iter()
        .filter_map(|t| {
            let symbol = t["symbol"].as_str()?;
            if !valid.is_empty() && !valid.contains(symbol) {
                return None;
            }
            if !symbol.ends_with(quote_asset) || symbol.starts_with(EXCLUDED_PREFIX) {
                return None;
            }
            let quote_volume = parse_str_f64(&t["quoteVolume"]).ok()?;
            if quote_volume.is_nan() || quote_volume <= 0.0 {
                return None;
            }
            Some(TickerSummary {
                symbol: symbol.to_string(),
                last_price: parse_str_f64(&t["lastPrice"]).ok()?,
                price_change_pct: parse_str_f64(&t["priceChangePercent"]).ok()?,
                quote_volume,
            })
        })
        .collect();

    tickers.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume));
    tickers.truncate(limit);
    Ok(tickers)
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}
