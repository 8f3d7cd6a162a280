// =============================================================================
// Binance public market-data access
// =============================================================================

pub mod client;
pub mod rate_limit;

pub use client::{BinanceClient, DEFAULT_BASE_URL};
pub use rate_limit::{RateLimitSnapshot, RateLimitTracker};
