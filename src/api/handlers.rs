//! API Handlers
//!
//! HTTP request handlers for the memoized aggregate and the cache
//! diagnostics endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::aggregate::{AggregateSnapshot, AggregateSource};
use crate::cache::{CacheRegistry, CacheStats, TtlCache};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{
    validate_key, AggregateQuery, AggregateResponse, HealthResponse, InvalidateResponse,
    StatsResponse,
};

/// Name of the cache memoizing aggregate computations.
pub const AGGREGATES_CACHE: &str = "aggregates";

/// Application state shared across all handlers.
///
/// Built once by the composition root; every field is a cheap shared handle.
#[derive(Clone)]
pub struct AppState {
    /// All named caches, for diagnostics and invalidation
    pub registry: Arc<CacheRegistry>,
    /// Memoized aggregate results
    pub aggregates: TtlCache<String, AggregateSnapshot>,
    /// The expensive computation behind `aggregates`
    pub source: Arc<AggregateSource>,
    /// How long a request waits for its aggregate before giving up
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState and registers the aggregate cache.
    pub fn new(aggregates: TtlCache<String, AggregateSnapshot>, source: AggregateSource) -> Self {
        let registry = CacheRegistry::new();
        registry.register(aggregates.clone());
        Self {
            registry: Arc::new(registry),
            aggregates,
            source: Arc::new(source),
            request_timeout: Config::default().request_timeout(),
        }
    }

    /// Overrides how long a request waits for its aggregate.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TtlCache::from_config(AGGREGATES_CACHE, config),
            AggregateSource::new(config.compute_delay()),
        )
        .with_request_timeout(config.request_timeout())
    }
}

/// Handler for GET /aggregate/:key
///
/// Serves the aggregate for `key` from the cache, computing it on a miss.
/// An optional `ttl` query parameter (seconds) overrides the cache default.
/// A request that waits longer than the configured timeout gets a 504; the
/// computation keeps running and stores its value for later requests.
pub async fn aggregate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<AggregateQuery>,
) -> Result<Json<AggregateResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(ServiceError::InvalidRequest(error_msg));
    }
    if let Some(error_msg) = query.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let ttl = query.ttl_or(state.aggregates.default_ttl());
    let source = Arc::clone(&state.source);
    let timeout_msg = format!("aggregate '{}' is still being computed", key);
    let lookup = state
        .aggregates
        .get_or_compute(key.clone(), ttl, move || async move {
            source.compute(key).await
        });
    let snapshot = tokio::time::timeout(state.request_timeout, lookup)
        .await
        .map_err(|_| ServiceError::Timeout(timeout_msg))??;

    Ok(Json(AggregateResponse::new(snapshot, ttl.as_secs())))
}

/// Handler for DELETE /aggregate/:key
///
/// Invalidates one memoized aggregate so the next request recomputes it.
pub async fn invalidate_aggregate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if state.aggregates.invalidate(&key) {
        Ok(Json(InvalidateResponse::key(&key)))
    } else {
        Err(ServiceError::NotFound(format!("key '{}'", key)))
    }
}

/// Handler for GET /stats
///
/// Returns statistics for every registered cache.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.registry.all_stats()))
}

/// Handler for GET /stats/:name
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheStats>> {
    state
        .registry
        .stats(&name)
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("cache '{}'", name)))
}

/// Handler for DELETE /cache
///
/// Invalidates every registered cache.
pub async fn invalidate_all_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    Json(InvalidateResponse::all(state.registry.invalidate_all()))
}

/// Handler for DELETE /cache/:name
pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state
        .registry
        .invalidate(&name)
        .ok_or_else(|| ServiceError::NotFound(format!("cache '{}'", name)))?;

    Ok(Json(InvalidateResponse::cache(&name, removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
