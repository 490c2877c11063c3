//! Cache Entry Module
//!
//! Defines a single memoized result together with the time it was computed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A computed value and the moment it was stored.
///
/// Entries are replaced wholesale when they go stale; their fields are never
/// updated in place. The only mutable part is the access tick, which a hit
/// can bump through a shared reference.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the computation that produced `value` finished
    pub created_at: Instant,
    /// TTL the entry was stored with
    pub ttl: Duration,
    /// Tick of the most recent store or hit, for least-recently-used eviction
    last_access: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with the current time and access tick `tick`.
    pub fn new(value: V, ttl: Duration, tick: u64) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
            last_access: AtomicU64::new(tick),
        }
    }

    // == Freshness ==
    /// Checks whether the entry is still valid for a caller asking with `ttl`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is stale, so a
    /// zero TTL is never fresh.
    pub fn is_fresh_for(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }

    /// Checks freshness against the TTL the entry was stored with.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_for(self.ttl)
    }

    /// Time elapsed since the entry was stored.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Recency ==
    /// Records an access at `tick`. Ticks never move backwards, so racing
    /// hits keep the newest one.
    pub fn touch(&self, tick: u64) {
        self.last_access.fetch_max(tick, Ordering::Relaxed);
    }

    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }
}
