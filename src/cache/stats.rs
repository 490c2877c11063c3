//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

// == Stats Counters ==
/// Lock-free counters owned by a cache instance.
///
/// Counters only ever grow; there is no reset.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounters {
    /// Creates counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

// == Cache Stats ==
/// Point-in-time snapshot of one cache, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Name the cache was created with
    pub name: String,
    /// Lookups served without running a computation
    pub hits: u64,
    /// Lookups that ran a computation (or found nothing, for plain gets)
    pub misses: u64,
    /// Entries removed by the capacity bound
    pub evictions: u64,
    /// Entries currently stored, fresh or stale
    pub entry_count: usize,
    /// Computations currently running
    pub in_flight: usize,
    /// hits + misses
    pub total_requests: u64,
    /// hits / (hits + misses), 0.0 before the first lookup
    pub hit_rate: f64,
    /// `hit_rate` as a percentage rounded to two decimals
    pub hit_rate_percent: f64,
    /// Default TTL in seconds
    pub default_ttl_secs: u64,
    /// Capacity bound, None when unbounded
    pub max_entries: Option<usize>,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from counter readings and current sizes.
    pub fn new(
        name: impl Into<String>,
        counters: &StatsCounters,
        entry_count: usize,
        in_flight: usize,
        default_ttl: Duration,
        max_entries: Option<usize>,
    ) -> Self {
        let hits = counters.hits();
        let misses = counters.misses();
        let total_requests = hits + misses;
        let rate = hit_rate(hits, misses);

        Self {
            name: name.into(),
            hits,
            misses,
            evictions: counters.evictions(),
            entry_count,
            in_flight,
            total_requests,
            hit_rate: rate,
            hit_rate_percent: (rate * 10_000.0).round() / 100.0,
            default_ttl_secs: default_ttl.as_secs(),
            max_entries,
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(counters: &StatsCounters) -> CacheStats {
        CacheStats::new("test", counters, 0, 0, Duration::from_secs(900), None)
    }

    #[test]
    fn test_counters_new() {
        let counters = StatsCounters::new();
        assert_eq!(counters.hits(), 0);
        assert_eq!(counters.misses(), 0);
        assert_eq!(counters.evictions(), 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = snapshot(&StatsCounters::new());
        assert_eq!(stats.hit_rate, 0.0);
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let counters = StatsCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        assert_eq!(snapshot(&counters).hit_rate, 1.0);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let counters = StatsCounters::new();
        counters.record_miss();
        counters.record_miss();
        assert_eq!(snapshot(&counters).hit_rate, 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::new();
        counters.record_hit();
        counters.record_miss();
        counters.record_miss();

        let stats = snapshot(&counters);
        assert_eq!(stats.total_requests, 3);
        assert!((stats.hit_rate - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.hit_rate_percent, 33.33);
    }

    #[test]
    fn test_record_eviction() {
        let counters = StatsCounters::new();
        counters.record_eviction();
        counters.record_eviction();
        assert_eq!(snapshot(&counters).evictions, 2);
    }

    #[test]
    fn test_snapshot_carries_sizes_and_config() {
        let counters = StatsCounters::new();
        let stats = CacheStats::new(
            "estatisticas",
            &counters,
            4,
            1,
            Duration::from_secs(86_400),
            Some(10),
        );

        assert_eq!(stats.name, "estatisticas");
        assert_eq!(stats.entry_count, 4);
        assert_eq!(stats.in_flight, 1);
        assert_eq!(stats.default_ttl_secs, 86_400);
        assert_eq!(stats.max_entries, Some(10));
    }

    #[test]
    fn test_stats_serialize() {
        let counters = StatsCounters::new();
        counters.record_hit();
        let json = serde_json::to_value(snapshot(&counters)).unwrap();

        assert_eq!(json["name"], "test");
        assert_eq!(json["hits"], 1);
        assert_eq!(json["hit_rate"], 1.0);
        assert!(json["max_entries"].is_null());
    }
}
