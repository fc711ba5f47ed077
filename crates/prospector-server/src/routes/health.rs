//! Service info and health routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_info))
        .route("/health", get(get_health))
}

/// GET /: service info.
async fn get_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "prospector",
        "version": env!("CARGO_PKG_VERSION"),
        "maxTopK": state.config.limits.max_top_k,
        "providerTimeoutSecs": state.config.provider_timeout.as_secs(),
        "endpoints": [
            "POST /api/queries/build",
            "GET /api/geography/{region}",
            "GET /api/context?industry=&region=",
            "GET /health",
        ],
    }))
}

/// GET /health: liveness plus the active model and cache size.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.orchestrator.status();
    let now = chrono::Utc::now();

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": now.to_rfc3339(),
        "uptimeSecs": (now - state.started_at).num_seconds(),
        "model": status.model.as_deref().unwrap_or("fallback"),
        "contextProvider": status.context_provider,
        "cacheSize": status.cache_entries,
    }))
}
