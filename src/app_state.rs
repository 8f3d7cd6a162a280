// =============================================================================
// Central Application State — Layerscan heatmap backend
// =============================================================================
//
// Everything a request handler needs: the reloadable config, the market-data
// source, the shared request-weight tracker and the heatmap cache.
//
// Thread safety:
//   - Atomic counters for lock-free cache statistics.
//   - parking_lot::RwLock for the config; never held across an `.await`.
//   - Arc wrappers for collaborators shared with other owners.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::binance::RateLimitTracker;
use crate::cache::ResponseCache;
use crate::heatmap::HeatmapResponse;
use crate::market_data::MarketDataSource;
use crate::runtime_config::RuntimeConfig;

/// Hit / miss counters of the heatmap cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Shared across all handlers via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    /// File `reload_config` reads from.
    pub config_path: PathBuf,

    // ── Market Data ─────────────────────────────────────────────────────
    pub source: Arc<dyn MarketDataSource>,
    pub rate_limits: Arc<RateLimitTracker>,

    // ── Caching ─────────────────────────────────────────────────────────
    pub cache: ResponseCache<HeatmapResponse>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        config_path: impl Into<PathBuf>,
        source: Arc<dyn MarketDataSource>,
        rate_limits: Arc<RateLimitTracker>,
    ) -> Self {
        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            config_path: config_path.into(),
            source,
            rate_limits,
            cache: ResponseCache::new(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Clone of the current configuration.
    pub fn config(&self) -> RuntimeConfig {
        self.runtime_config.read().clone()
    }

    /// Re-read the config file and swap it in.  On error the current config
    /// stays untouched.  Cached heatmaps are dropped since they were scored
    /// with the old thresholds.
    ///
    /// Scan settings (quote asset, limits, layer thresholds) apply to the
    /// next scan.  `bind_addr` and `binance_base_url` need a restart.
    pub fn reload_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::load(&self.config_path)?;
        config.apply_env_overrides(|k| std::env::var(k).ok());

        let previous = std::mem::replace(&mut *self.runtime_config.write(), config.clone());
        for field in previous.restart_only_changes(&config) {
            warn!(field, "changed on reload but only takes effect after restart");
        }
        self.cache.clear();

        info!(path = %self.config_path.display(), "runtime config reloaded");
        Ok(config)
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config_path", &self.config_path)
            .field("cache", &self.cache)
            .field("rate_limits", &self.rate_limits)
            .finish()
    }
}
