// =============================================================================
// Response Cache — TTL key/value store for computed heatmaps
// =============================================================================
//
// One entry per `(limit, timeframe)` pair, keyed `heatmap_{limit}_{timeframe}`.
// Every lookup first sweeps out expired entries, so the map never holds more
// than the set of keys requested within the last TTL.
//
// Entries live in process memory only; a restart starts cold.
// =============================================================================

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::types::Timeframe;

struct Entry<T> {
    payload: T,
    expires_at: Instant,
}

/// Thread-safe TTL cache.  Cloning a payload out is the only way to read it.
pub struct ResponseCache<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn key(limit: usize, timeframe: Timeframe) -> String {
        format!("heatmap_{limit}_{timeframe}")
    }

    /// Live payload for `(limit, timeframe)`, if any.
    pub fn get(&self, limit: usize, timeframe: Timeframe) -> Option<T> {
        let key = Self::key(limit, timeframe);
        let now = Instant::now();

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "expired cache entries removed");
        }

        entries.get(&key).map(|e| e.payload.clone())
    }

    /// Store `payload` for `ttl`, replacing any previous entry for the key.
    pub fn set(&self, limit: usize, timeframe: Timeframe, payload: T, ttl: Duration) {
        let key = Self::key(limit, timeframe);
        debug!(key = %key, ttl_secs = ttl.as_secs(), "cache entry stored");
        self.entries.write().insert(
            key,
            Entry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ResponseCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}
