//! Aggregate Source
//!
//! Stand-in for an expensive aggregate query. Each computation sleeps for a
//! configured latency and is stamped with a sequence number, which makes it
//! visible from the outside whether a response was memoized or recomputed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// Result of one aggregate computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    /// Key the aggregate was computed for
    pub key: String,
    /// 1-based number of the computation that produced this snapshot
    pub sequence: u64,
    /// When the computation finished (RFC 3339)
    pub computed_at: String,
}

/// Simulated slow aggregate query.
#[derive(Debug)]
pub struct AggregateSource {
    delay: Duration,
    computations: AtomicU64,
}

impl AggregateSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            computations: AtomicU64::new(0),
        }
    }

    /// Runs the aggregate for `key`.
    pub async fn compute(&self, key: String) -> Result<AggregateSnapshot> {
        tokio::time::sleep(self.delay).await;
        let sequence = self.computations.fetch_add(1, Ordering::SeqCst) + 1;
        info!(key = %key, sequence, "aggregate computed");

        Ok(AggregateSnapshot {
            key,
            sequence,
            computed_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Number of computations run so far.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::SeqCst)
    }
}
