// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/` and are public.  Heatmap scans go through
// the response cache; only successful scans are stored, so a transient
// upstream failure is retried on the next request.
//
// CORS is configured permissively: the heatmap UI is served from another
// origin.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::app_state::{AppState, CacheStats};
use crate::binance::RateLimitSnapshot;
use crate::heatmap::{build_heatmap, summarize, HeatmapResponse, SignalStats};
use crate::runtime_config::RuntimeConfig;
use crate::types::Timeframe;

pub const CACHE_HEADER: &str = "X-Cache";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(root))
        .route("/api/health", get(health))
        .route("/api/heatmap", get(heatmap))
        .route("/api/stats", get(stats))
        .route("/api/settings/reload", post(reload_settings))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Root / Health
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Layerscan RSI signal heatmap API",
        "status": "running",
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
    rate_limits: RateLimitSnapshot,
    cache: CacheStats,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
        rate_limits: state.rate_limits.snapshot(),
        cache: state.cache_stats(),
    };
    Json(resp)
}

// =============================================================================
// Heatmap / Stats
// =============================================================================

#[derive(Debug, Deserialize)]
struct HeatmapQuery {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    timeframe: Option<String>,
}

async fn heatmap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> Response {
    let config = state.config();
    let (limit, timeframe) = match resolve(&config, &query) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (resp, hit) = cached_or_build(&state, &config, limit, timeframe).await;
    let cache_status = if hit { "HIT" } else { "MISS" };
    ([(CACHE_HEADER, cache_status)], Json(resp)).into_response()
}

#[derive(Serialize)]
struct StatsResponse {
    success: bool,
    timeframe: Timeframe,
    stats: SignalStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> Response {
    let config = state.config();
    let (limit, timeframe) = match resolve(&config, &query) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (heatmap, _) = cached_or_build(&state, &config, limit, timeframe).await;
    Json(StatsResponse {
        success: heatmap.success,
        timeframe,
        stats: summarize(&heatmap),
        error: heatmap.error,
    })
    .into_response()
}

/// Apply query defaults and reject unknown timeframes with `400`.
fn resolve(config: &RuntimeConfig, query: &HeatmapQuery) -> Result<(usize, Timeframe), Response> {
    let limit = config.clamp_limit(query.limit);
    let timeframe = match query.timeframe.as_deref() {
        None => Timeframe::default(),
        Some(label) => label.parse::<Timeframe>().map_err(|e| {
            let body = serde_json::json!({ "success": false, "error": e.to_string() });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })?,
    };
    Ok((limit, timeframe))
}

/// Cached heatmap for `(limit, timeframe)` or a fresh scan.  The flag is
/// `true` on a cache hit.
async fn cached_or_build(
    state: &AppState,
    config: &RuntimeConfig,
    limit: usize,
    timeframe: Timeframe,
) -> (HeatmapResponse, bool) {
    if let Some(cached) = state.cache.get(limit, timeframe) {
        state.record_cache_hit();
        debug!(limit, %timeframe, "heatmap served from cache");
        return (cached, true);
    }
    state.record_cache_miss();

    let resp = build_heatmap(state.source.as_ref(), limit, timeframe, config).await;
    if resp.success {
        state.cache.set(
            limit,
            timeframe,
            resp.clone(),
            Duration::from_secs(config.cache_ttl_secs),
        );
    }
    (resp, false)
}

// =============================================================================
// Settings
// =============================================================================

async fn reload_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.reload_config() {
        Ok(config) => {
            info!("settings reloaded via API");
            Json(serde_json::json!({ "success": true, "config": config })).into_response()
        }
        Err(e) => {
            error!(error = %e, "settings reload failed");
            let body = serde_json::json!({ "success": false, "error": format!("{e:#}") });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
