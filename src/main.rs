// =============================================================================
// Layerscan — Main Entry Point
// =============================================================================
//
// Serves the RSI signal-layer heatmap over HTTP.  All market data is pulled
// on demand from public endpoints; nothing runs between requests.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod binance;
mod cache;
mod heatmap;
mod indicators;
mod market_data;
mod runtime_config;
mod signals;
mod types;

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::binance::{BinanceClient, RateLimitTracker};
use crate::market_data::MarketDataSource;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Layerscan heatmap backend starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides(|k| std::env::var(k).ok());

    info!(
        bind_addr = %config.bind_addr,
        binance_base_url = %config.binance_base_url,
        quote_asset = %config.quote_asset,
        max_limit = config.max_limit,
        cache_ttl_secs = config.cache_ttl_secs,
        "Configuration resolved"
    );

    // ── 2. Market-data client ────────────────────────────────────────────
    let rate_limits = Arc::new(RateLimitTracker::new());
    let client = BinanceClient::new(config.binance_base_url.clone(), rate_limits.clone())?;
    let source: Arc<dyn MarketDataSource> = Arc::new(client);

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, CONFIG_PATH, source, rate_limits));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    // ── 5. Serve until Ctrl+C ────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await?;

    info!(
        uptime_secs = state.uptime_secs(),
        cache = ?state.cache_stats(),
        "Layerscan shut down complete."
    );
    Ok(())
}
