// =============================================================================
// Runtime Configuration — Reloadable service settings with atomic save
// =============================================================================
//
// Every tunable of the heatmap service lives here: where to listen, which
// exchange mirror to read, how wide a scan may be, how long results are
// cached, and the classifier thresholds.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::binance::DEFAULT_BASE_URL;
use crate::signals::LayerParams;

pub const ENV_BIND_ADDR: &str = "LAYERSCAN_BIND_ADDR";
pub const ENV_BINANCE_URL: &str = "LAYERSCAN_BINANCE_URL";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_binance_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    250
}

fn default_klines_limit() -> u32 {
    100
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level service configuration, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Market-data REST root.
    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,

    /// Symbols scanned when a request names no limit.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper clamp for the requested scan width.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Candles requested per symbol.
    #[serde(default = "default_klines_limit")]
    pub klines_limit: u32,

    /// Lifetime of a cached heatmap.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Concurrent klines requests per scan.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Quote asset defining the symbol universe.
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    #[serde(default)]
    pub layer_params: LayerParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            binance_base_url: default_binance_base_url(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            klines_limit: default_klines_limit(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            quote_asset: default_quote_asset(),
            layer_params: LayerParams::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// Returns an error if the file cannot be read or parsed; the caller may
    /// fall back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            max_limit = config.max_limit,
            cache_ttl_secs = config.cache_ttl_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `LAYERSCAN_*` overrides.  `lookup` is `std::env::var(..).ok()`
    /// in production.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|s| !s.is_empty()) {
            info!(bind_addr = %addr, "bind address overridden from environment");
            self.bind_addr = addr;
        }
        if let Some(url) = lookup(ENV_BINANCE_URL).filter(|s| !s.is_empty()) {
            info!(binance_base_url = %url, "market-data URL overridden from environment");
            self.binance_base_url = url;
        }
    }

    /// Fields that differ from `other` but only take effect on restart: the
    /// listener and the market-data client are built once at startup.
    pub fn restart_only_changes(&self, other: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.bind_addr != other.bind_addr {
            changed.push("bind_addr");
        }
        if self.binance_base_url != other.binance_base_url {
            changed.push("binance_base_url");
        }
        changed
    }

    /// Resolve a requested scan width: `default_limit` when absent, clamped
    /// to `1..=max_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}
