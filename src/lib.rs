//! ttl_memo - In-process TTL cache with singleflight recomputation
//!
//! Memoizes expensive computations per key, recomputes them lazily once
//! their TTL has elapsed, and collapses concurrent recomputation of a key
//! into one computation. Ships a small diagnostics service exposing cache
//! statistics and invalidation over HTTP.

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheRegistry, CacheStats, TtlCache};
pub use config::Config;
