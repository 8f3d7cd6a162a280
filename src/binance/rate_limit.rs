// =============================================================================
// Request-Weight Tracker — keeps heatmap scans under the public API budget
// =============================================================================
//
// The public market-data endpoints share a request-weight budget of 1200 per
// minute per IP.  A full heatmap scan costs one `ticker/24hr` (weight 80),
// one `exchangeInfo` (weight 20) and one `klines` per symbol (weight 2), so a
// handful of uncached 250-symbol scans in one minute can exhaust it.
//
// The tracker reads `X-MBX-USED-WEIGHT-1M` after every response and keeps an
// atomic counter that any task may query lock-free.  The header value belongs
// to the UTC minute it was received in; once that minute is over the counter
// is stale and reads as zero, so a blocked tracker recovers without traffic.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};
use tracing::{debug, warn};

pub const USED_WEIGHT_HEADER: &str = "X-MBX-USED-WEIGHT-1M";

/// Ceiling at which klines requests are refused.
const WEIGHT_HARD_LIMIT: u32 = 1100;
/// Soft warning threshold.
const WEIGHT_WARN_THRESHOLD: u32 = 900;

/// Thread-safe request-weight tracker.
pub struct RateLimitTracker {
    used_weight_1m: AtomicU32,
    /// UTC minute (unix seconds / 60) the weight was last reported in.
    weight_minute: AtomicI64,
    requests_sent: AtomicU64,
    requests_blocked: AtomicU64,
}

fn current_minute() -> i64 {
    chrono::Utc::now().timestamp().div_euclid(60)
}

/// Serialisable view of the tracker, reported by `/api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub used_weight_1m: u32,
    pub hard_limit: u32,
    pub requests_sent: u64,
    pub requests_blocked: u64,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self {
            used_weight_1m: AtomicU32::new(0),
            weight_minute: AtomicI64::new(current_minute()),
            requests_sent: AtomicU64::new(0),
            requests_blocked: AtomicU64::new(0),
        }
    }

    /// Record a completed request and refresh the weight from its headers.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        self.update_from_headers_at(headers, current_minute());
    }

    fn update_from_headers_at(&self, headers: &reqwest::header::HeaderMap, minute: i64) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);

        let Some(w) = headers
            .get(USED_WEIGHT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
        else {
            return;
        };

        let prev = self.weight_at(minute);
        self.used_weight_1m.store(w, Ordering::Relaxed);
        self.weight_minute.store(minute, Ordering::Relaxed);
        if w >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
            warn!(
                used_weight = w,
                hard_limit = WEIGHT_HARD_LIMIT,
                "request weight crossed warning threshold"
            );
        }
        debug!(used_weight_1m = w, "request weight updated from header");
    }

    /// `true` if `weight` more can be spent without crossing the hard limit.
    /// A refusal is counted in the snapshot.
    pub fn can_send_request(&self, weight: u32) -> bool {
        self.can_send_request_at(weight, current_minute())
    }

    fn can_send_request_at(&self, weight: u32, minute: i64) -> bool {
        let current = self.weight_at(minute);
        let allowed = current.saturating_add(weight) <= WEIGHT_HARD_LIMIT;
        if !allowed {
            self.requests_blocked.fetch_add(1, Ordering::Relaxed);
            warn!(
                current_weight = current,
                requested_weight = weight,
                hard_limit = WEIGHT_HARD_LIMIT,
                "request blocked, would exceed weight limit"
            );
        }
        allowed
    }

    /// Used weight as seen from `minute`.  A value from an earlier minute has
    /// expired upstream and is reset to zero here.
    fn weight_at(&self, minute: i64) -> u32 {
        let recorded = self.weight_minute.load(Ordering::Relaxed);
        if minute > recorded {
            let stale = self.used_weight_1m.swap(0, Ordering::Relaxed);
            self.weight_minute.store(minute, Ordering::Relaxed);
            if stale > 0 {
                debug!(stale_weight = stale, "weight window rolled over, counter reset");
            }
            return 0;
        }
        self.used_weight_1m.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.snapshot_at(current_minute())
    }

    fn snapshot_at(&self, minute: i64) -> RateLimitSnapshot {
        RateLimitSnapshot {
            used_weight_1m: self.weight_at(minute),
            hard_limit: WEIGHT_HARD_LIMIT,
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            requests_blocked: self.requests_blocked.load(Ordering::Relaxed),
        }
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("used_weight_1m", &self.used_weight_1m.load(Ordering::Relaxed))
            .field("requests_sent", &self.requests_sent.load(Ordering::Relaxed))
            .finish()
    }
}
