//! API Routes
//!
//! Configures the Axum router with the aggregate and diagnostics endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    aggregate_handler, cache_stats_handler, health_handler, invalidate_aggregate_handler,
    invalidate_all_handler, invalidate_cache_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /aggregate/:key` - Memoized aggregate (optional `?ttl=<secs>`)
/// - `DELETE /aggregate/:key` - Invalidate one aggregate
/// - `GET /stats` - Statistics for every cache
/// - `GET /stats/:name` - Statistics for one cache
/// - `DELETE /cache` - Invalidate every cache
/// - `DELETE /cache/:name` - Invalidate one cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/aggregate/:key",
            get(aggregate_handler).delete(invalidate_aggregate_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/stats/:name", get(cache_stats_handler))
        .route("/cache", delete(invalidate_all_handler))
        .route("/cache/:name", delete(invalidate_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateSource;
    use crate::cache::TtlCache;
    use crate::api::AGGREGATES_CACHE;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(
            TtlCache::new(AGGREGATES_CACHE, Duration::from_secs(900)),
            AggregateSource::new(Duration::from_millis(1)),
        );
        create_router(state)
    }

    async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_aggregate_endpoint() {
        assert_eq!(
            status_of(create_test_app(), "GET", "/aggregate/despesas").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_unknown_cache_not_found() {
        assert_eq!(
            status_of(create_test_app(), "DELETE", "/cache/unknown").await,
            StatusCode::NOT_FOUND
        );
    }
}
