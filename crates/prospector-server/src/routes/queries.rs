//! Query-building, geography and context routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use prospector_core::{Error, QueryRequest};
use serde::Deserialize;
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/queries/build", post(build_queries))
        .route("/geography/{region}", get(get_geography))
        .route("/context", get(get_context))
}

#[derive(Debug, Deserialize)]
struct ContextQuery {
    industry: Option<String>,
    region: Option<String>,
}

/// POST /api/queries/build: run the full pipeline.
async fn build_queries(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    match state.orchestrator.build(&req).await {
        Ok(response) => (StatusCode::OK, Json(serde_json::json!(response))),
        Err(Error::Validation(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": msg })),
        ),
        Err(e) => {
            error!("Query build failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /api/geography/{region}: locality record.
async fn get_geography(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.orchestrator.resolve_geography(&region)))
}

/// GET /api/context?industry=&region=: market context (cached).
async fn get_context(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContextQuery>,
) -> impl IntoResponse {
    let max_len = state.orchestrator.limits().max_field_len;
    let industry = query.industry.unwrap_or_default();
    let region = query.region.unwrap_or_default();

    for (name, value) in [("industry", &industry), ("region", &region)] {
        if value.trim().is_empty() || value.chars().count() > max_len {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!("{} must be 1 to {} characters", name, max_len),
                })),
            );
        }
    }

    let context = state.orchestrator.resolve_context(&industry, &region).await;
    (StatusCode::OK, Json(serde_json::json!(context)))
}
