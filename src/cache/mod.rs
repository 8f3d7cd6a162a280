// =============================================================================
// Response caching for expensive heatmap scans
// =============================================================================

pub mod response_cache;

pub use response_cache::ResponseCache;
