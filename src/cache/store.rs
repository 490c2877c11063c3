//! Cache Store Module
//!
//! Main cache engine: memoizes computed values per key, replaces them lazily
//! once their TTL has elapsed, and collapses concurrent recomputation of the
//! same key into a single computation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, StatsCounters};
use crate::config::Config;

// == TTL Cache ==
/// Generic TTL cache with singleflight recomputation.
///
/// `TtlCache` is a cheap handle: clones share the same storage, so one
/// instance can be created by the composition root and handed to every
/// handler that needs it.
pub struct TtlCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<K, V> {
    /// Name reported in stats and logs
    name: String,
    /// TTL used by `get_or_compute_default`
    default_ttl: Duration,
    /// Capacity bound, None = unbounded
    max_entries: Option<usize>,
    /// Stored entries and in-flight computations
    state: RwLock<State<K, V>>,
    /// Source of access ticks; hits bump the entry's tick under the shared
    /// lock, eviction picks the smallest tick under the exclusive one
    clock: AtomicU64,
    /// Hit/miss/eviction counters
    counters: StatsCounters,
}

struct State<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    flights: HashMap<K, Flight<V>>,
    next_flight_id: u64,
}

/// A computation currently running for one key.
struct Flight<V> {
    /// Distinguishes this computation from a later one for the same key
    id: u64,
    /// Becomes `Some(value)` when the computation succeeds
    done: watch::Receiver<Option<V>>,
}

enum Lookup<V> {
    /// A fresh entry was found
    Fresh(V),
    /// Another caller is computing the key
    Pending(watch::Receiver<Option<V>>),
    /// This caller must compute the key
    Claimed {
        id: u64,
        done: watch::Sender<Option<V>>,
    },
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates an unbounded cache.
    ///
    /// # Arguments
    /// * `name` - Name reported in stats and logs
    /// * `default_ttl` - TTL used by `get_or_compute_default`
    pub fn new(name: impl Into<String>, default_ttl: Duration) -> Self {
        Self::build(name.into(), default_ttl, None)
    }

    /// Creates a cache holding at most `max_entries` entries (at least one),
    /// evicting the least recently used entry when a new key is stored at
    /// capacity.
    pub fn bounded(name: impl Into<String>, default_ttl: Duration, max_entries: usize) -> Self {
        Self::build(name.into(), default_ttl, Some(max_entries.max(1)))
    }

    /// Creates a cache from configuration. `max_entries == 0` means unbounded.
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        let ttl = config.default_ttl();
        match config.max_entries {
            0 => Self::new(name, ttl),
            max => Self::bounded(name, ttl, max),
        }
    }

    fn build(name: String, default_ttl: Duration, max_entries: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                default_ttl,
                max_entries,
                state: RwLock::new(State {
                    entries: HashMap::new(),
                    flights: HashMap::new(),
                    next_flight_id: 0,
                }),
                clock: AtomicU64::new(0),
                counters: StatsCounters::new(),
            }),
        }
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key` if it is fresh under `ttl`,
    /// otherwise runs `compute`, stores its result and returns it.
    ///
    /// - A zero `ttl` always recomputes.
    /// - Concurrent callers for the same stale or missing key share one
    ///   computation and all receive its value.
    /// - An error from `compute` is returned as-is and nothing is stored; a
    ///   stale entry already present is left in place. Callers that were
    ///   waiting on a failed computation contend for the key again.
    /// - The computation runs on its own task, so it completes and stores its
    ///   value even if the caller that started it is dropped.
    /// - A panic inside `compute` is resumed on the caller that started it.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + 'static,
    {
        let (id, done) = loop {
            match self.inner.lookup(&key, ttl) {
                Lookup::Fresh(value) => {
                    self.inner.counters.record_hit();
                    debug!(cache = %self.inner.name, key = ?key, "cache hit");
                    return Ok(value);
                }
                Lookup::Pending(mut pending) => {
                    let delivered = pending
                        .wait_for(Option::is_some)
                        .await
                        .map(|value| (*value).clone());
                    if let Ok(Some(value)) = delivered {
                        self.inner.counters.record_hit();
                        debug!(cache = %self.inner.name, key = ?key, "joined in-flight computation");
                        return Ok(value);
                    }
                    // Computation failed without a value; contend again
                }
                Lookup::Claimed { id, done } => break (id, done),
            }
        };

        self.inner.counters.record_miss();
        debug!(cache = %self.inner.name, key = ?key, "cache miss, computing");

        let guard = FlightGuard {
            inner: Arc::clone(&self.inner),
            key,
            id,
            done,
            finished: false,
        };
        let computation = compute();
        let task = tokio::spawn(async move {
            let result = computation.await;
            match &result {
                Ok(value) => guard.finish(value.clone(), ttl),
                Err(_) => warn!(
                    cache = %guard.inner.name,
                    key = ?guard.key,
                    "computation failed, nothing stored"
                ),
            }
            result
        });

        match task.await {
            Ok(result) => result,
            Err(err) => match err.try_into_panic() {
                Ok(payload) => std::panic::resume_unwind(payload),
                // Only a runtime shutdown cancels the computation task
                Err(err) => panic!(
                    "computation for cache '{}' was cancelled: {}",
                    self.inner.name, err
                ),
            },
        }
    }

    /// `get_or_compute` with the cache's default TTL.
    pub async fn get_or_compute_default<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + 'static,
    {
        self.get_or_compute(key, self.inner.default_ttl, compute).await
    }

    // == Get ==
    /// Returns the stored value if it is fresh under the TTL it was stored
    /// with. Counts a hit or a miss; never computes.
    pub fn get(&self, key: &K) -> Option<V> {
        let state = self.inner.state.read();
        match state.entries.get(key) {
            Some(entry) if entry.is_fresh() => {
                let value = entry.value.clone();
                self.inner.refresh_recency(entry);
                self.inner.counters.record_hit();
                Some(value)
            }
            _ => {
                self.inner.counters.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores a value directly, replacing any existing entry for `key`.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let mut state = self.inner.state.write();
        self.inner.store_locked(&mut state, key, value, ttl);
    }

    // == Invalidate ==
    /// Removes the entry for `key` so the next access is a miss.
    ///
    /// A computation already running for the key is detached: callers waiting
    /// on it still receive its value, but the value is not stored.
    ///
    /// Returns true if an entry was removed.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut state = self.inner.state.write();
        let removed = state.entries.remove(key).is_some();
        let detached = state.flights.remove(key).is_some();
        debug!(cache = %self.inner.name, key = ?key, removed, detached, "cache key invalidated");
        removed
    }

    // == Clear ==
    /// Invalidates every key. Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut state = self.inner.state.write();
        let removed = state.entries.len();
        state.entries.clear();
        state.flights.clear();
        debug!(cache = %self.inner.name, removed, "cache cleared");
        removed
    }

    // == Stats ==
    /// Returns a point-in-time snapshot of the cache statistics.
    ///
    /// Only takes the shared lock briefly; never waits on a computation.
    pub fn stats(&self) -> CacheStats {
        let (entry_count, in_flight) = {
            let state = self.inner.state.read();
            (state.entries.len(), state.flights.len())
        };
        CacheStats::new(
            self.inner.name.clone(),
            &self.inner.counters,
            entry_count,
            in_flight,
            self.inner.default_ttl,
            self.inner.max_entries,
        )
    }

    /// Returns the number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.inner.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.inner.max_entries
    }
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Decides whether the caller gets a fresh value, waits on a running
    /// computation, or becomes the one computing the key.
    fn lookup(&self, key: &K, ttl: Duration) -> Lookup<V> {
        {
            let state = self.state.read();
            if let Some(found) = self.peek_locked(&state, key, ttl) {
                return found;
            }
        }

        let mut state = self.state.write();
        // Re-check: another caller may have claimed or stored the key while
        // the shared lock was released
        if let Some(found) = self.peek_locked(&state, key, ttl) {
            return found;
        }

        let id = state.next_flight_id;
        state.next_flight_id += 1;
        let (done, receiver) = watch::channel(None);
        state.flights.insert(
            key.clone(),
            Flight {
                id,
                done: receiver,
            },
        );
        Lookup::Claimed { id, done }
    }

    fn peek_locked(&self, state: &State<K, V>, key: &K, ttl: Duration) -> Option<Lookup<V>> {
        if let Some(entry) = state.entries.get(key) {
            if entry.is_fresh_for(ttl) {
                let value = entry.value.clone();
                self.refresh_recency(entry);
                return Some(Lookup::Fresh(value));
            }
        }
        state
            .flights
            .get(key)
            .map(|flight| Lookup::Pending(flight.done.clone()))
    }

    fn next_tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn refresh_recency(&self, entry: &CacheEntry<V>) {
        if self.max_entries.is_some() {
            entry.touch(self.next_tick());
        }
    }

    /// Stores the result of flight `id` unless the flight was detached.
    fn complete_flight(&self, key: &K, id: u64, value: V, ttl: Duration) -> bool {
        let mut state = self.state.write();
        if !matches!(state.flights.get(key), Some(flight) if flight.id == id) {
            return false;
        }
        state.flights.remove(key);
        self.store_locked(&mut state, key.clone(), value, ttl);
        true
    }

    /// Clears the in-flight marker of flight `id` after it failed.
    fn abandon_flight(&self, key: &K, id: u64) {
        let mut state = self.state.write();
        if matches!(state.flights.get(key), Some(flight) if flight.id == id) {
            state.flights.remove(key);
        }
    }

    fn store_locked(&self, state: &mut State<K, V>, key: K, value: V, ttl: Duration) {
        if let Some(max_entries) = self.max_entries {
            if !state.entries.contains_key(&key) {
                while state.entries.len() >= max_entries {
                    let Some(oldest) = state
                        .entries
                        .iter()
                        .min_by_key(|(_, entry)| entry.last_access())
                        .map(|(oldest, _)| oldest.clone())
                    else {
                        break;
                    };
                    state.entries.remove(&oldest);
                    self.counters.record_eviction();
                    debug!(cache = %self.name, key = ?oldest, "evicted least recently used entry");
                }
            }
        }
        let entry = CacheEntry::new(value, ttl, self.next_tick());
        state.entries.insert(key, entry);
    }
}

// == Flight Guard ==
/// Owned by the task running a computation. Publishes the value on success;
/// on failure or panic, its drop clears the in-flight marker and closes the
/// channel so waiters contend for the key again.
struct FlightGuard<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    inner: Arc<Inner<K, V>>,
    key: K,
    id: u64,
    done: watch::Sender<Option<V>>,
    finished: bool,
}

impl<K, V> FlightGuard<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn finish(mut self, value: V, ttl: Duration) {
        let stored = self.inner.complete_flight(&self.key, self.id, value.clone(), ttl);
        if stored {
            debug!(cache = %self.inner.name, key = ?self.key, "computed value stored");
        } else {
            debug!(cache = %self.inner.name, key = ?self.key, "key invalidated during computation, value not stored");
        }
        self.finished = true;
        self.done.send_replace(Some(value));
    }
}

impl<K, V> Drop for FlightGuard<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn drop(&mut self) {
        if !self.finished {
            self.inner.abandon_flight(&self.key, self.id);
        }
    }
}
