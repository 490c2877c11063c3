//! Cache Module
//!
//! Provides an in-process TTL cache that memoizes expensive computations,
//! collapses concurrent recomputation of a key, and reports hit/miss
//! statistics through a registry of named caches.

mod entry;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use registry::{CacheRegistry, ManagedCache};
pub use stats::{hit_rate, CacheStats, StatsCounters};
pub use store::TtlCache;
