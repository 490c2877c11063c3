//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::aggregate::AggregateSnapshot;
use crate::cache::{hit_rate, CacheStats};

/// Response body for `GET /aggregate/:key`
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    /// The requested key
    pub key: String,
    /// Sequence number of the computation that produced the value
    pub sequence: u64,
    /// When that computation finished
    pub computed_at: String,
    /// TTL applied to this lookup, in seconds
    pub ttl_secs: u64,
}

impl AggregateResponse {
    pub fn new(snapshot: AggregateSnapshot, ttl_secs: u64) -> Self {
        Self {
            key: snapshot.key,
            sequence: snapshot.sequence,
            computed_at: snapshot.computed_at,
            ttl_secs,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Per-cache statistics, sorted by name
    pub caches: Vec<CacheStats>,
    /// Hits summed over all caches
    pub total_hits: u64,
    /// Misses summed over all caches
    pub total_misses: u64,
    /// Overall hit rate (total_hits / (total_hits + total_misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Aggregates per-cache statistics into one response.
    pub fn new(caches: Vec<CacheStats>) -> Self {
        let total_hits = caches.iter().map(|c| c.hits).sum();
        let total_misses = caches.iter().map(|c| c.misses).sum();
        Self {
            caches,
            total_hits,
            total_misses,
            hit_rate: hit_rate(total_hits, total_misses),
        }
    }
}

/// Response body for the invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    /// `DELETE /cache`
    pub fn all(removed: usize) -> Self {
        Self {
            message: "All caches invalidated".to_string(),
            removed,
        }
    }

    /// `DELETE /cache/:name`
    pub fn cache(name: &str, removed: usize) -> Self {
        Self {
            message: format!("Cache '{}' invalidated", name),
            removed,
        }
    }

    /// `DELETE /aggregate/:key`
    pub fn key(key: &str) -> Self {
        Self {
            message: format!("Key '{}' invalidated", key),
            removed: 1,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
