//! HTTP route handlers.

pub mod health;
pub mod queries;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new().merge(queries::routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use prospector_core::ProspectorConfig;
    use prospector_runtime::Orchestrator;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ProspectorConfig::default();
        let orchestrator = Orchestrator::from_config(&config, None, None).unwrap();
        build_router(Arc::new(AppState::new(config, orchestrator)))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "fallback");
        assert_eq!(body["cacheSize"], 0);
    }

    #[tokio::test]
    async fn test_build_queries() {
        let (status, body) = send(post_json(
            "/api/queries/build",
            serde_json::json!({"industry": "bakery", "region": "Austin", "top_k": 5}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["queries"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["analytics"]["total_generated"], 5);
        assert_eq!(body["meta"]["fallback_used"], true);
        assert_eq!(body["request_id"].as_str().map(str::len), Some(8));
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_top_k() {
        let (status, body) = send(post_json(
            "/api/queries/build",
            serde_json::json!({"industry": "bakery", "region": "Austin", "top_k": 500}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("top_k"));
    }

    #[tokio::test]
    async fn test_geography_route() {
        let (status, body) = send(
            Request::get("/api/geography/Zanzibar%20Town")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["metro_areas"],
            serde_json::json!(["Zanzibar Town", "Greater Zanzibar Town"])
        );
    }

    #[tokio::test]
    async fn test_context_route() {
        let (status, body) = send(
            Request::get("/api/context?industry=bakery&region=Austin")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keyword_variations"][0], "bakery");

        let (status, _) = send(
            Request::get("/api/context?industry=bakery")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
