//! Cache Registry Module
//!
//! Keeps track of every named cache in the application so their statistics
//! can be reported and their contents invalidated from one place.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use parking_lot::RwLock;
use tracing::info;

use crate::cache::{CacheStats, TtlCache};

// == Managed Cache ==
/// Type-erased view of a cache, independent of its key and value types.
pub trait ManagedCache: Send + Sync {
    /// Name the cache is registered under
    fn name(&self) -> &str;
    /// Point-in-time statistics
    fn stats(&self) -> CacheStats;
    /// Invalidates every entry, returning how many were removed
    fn clear(&self) -> usize;
}

impl<K, V> ManagedCache for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        TtlCache::name(self)
    }

    fn stats(&self) -> CacheStats {
        TtlCache::stats(self)
    }

    fn clear(&self) -> usize {
        TtlCache::clear(self)
    }
}

// == Cache Registry ==
/// Registry of named caches.
///
/// Created by the composition root and shared with whatever needs to observe
/// or invalidate caches; there is no process-wide instance.
#[derive(Default)]
pub struct CacheRegistry {
    caches: RwLock<BTreeMap<String, Box<dyn ManagedCache>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Registers a cache under its own name, replacing any cache previously
    /// registered with the same name.
    pub fn register<C>(&self, cache: C)
    where
        C: ManagedCache + 'static,
    {
        let name = cache.name().to_string();
        let replaced = self
            .caches
            .write()
            .insert(name.clone(), Box::new(cache))
            .is_some();
        info!(cache = %name, replaced, "cache registered");
    }

    /// Names of all registered caches, sorted.
    pub fn names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }

    // == Stats ==
    /// Statistics for every registered cache, sorted by name.
    pub fn all_stats(&self) -> Vec<CacheStats> {
        self.caches.read().values().map(|c| c.stats()).collect()
    }

    /// Statistics for one cache, None if no cache has that name.
    pub fn stats(&self, name: &str) -> Option<CacheStats> {
        self.caches.read().get(name).map(|c| c.stats())
    }

    // == Invalidate ==
    /// Invalidates one cache. Returns the number of entries removed, or None
    /// if no cache has that name.
    pub fn invalidate(&self, name: &str) -> Option<usize> {
        let removed = self.caches.read().get(name).map(|c| c.clear())?;
        info!(cache = %name, removed, "cache invalidated");
        Some(removed)
    }

    /// Invalidates every registered cache. Returns the total number of
    /// entries removed.
    pub fn invalidate_all(&self) -> usize {
        let caches = self.caches.read();
        let removed = caches.values().map(|c| c.clear()).sum();
        info!(caches = caches.len(), removed, "all caches invalidated");
        removed
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn registry_with_caches() -> (CacheRegistry, TtlCache<String, u64>, TtlCache<&'static str, f64>) {
        let registry = CacheRegistry::new();
        let estatisticas = TtlCache::new("estatisticas", DAY);
        let distribuicao = TtlCache::new("distribuicao_uf", DAY);
        registry.register(estatisticas.clone());
        registry.register(distribuicao.clone());
        (registry, estatisticas, distribuicao)
    }

    #[test]
    fn test_register_and_list_names() {
        let (registry, _, _) = registry_with_caches();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["distribuicao_uf", "estatisticas"]);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let registry = CacheRegistry::new();
        let first: TtlCache<String, u64> = TtlCache::new("stats", DAY);
        let second: TtlCache<String, u64> = TtlCache::new("stats", DAY);
        first.insert("k".to_string(), 1, DAY);

        registry.register(first);
        registry.register(second);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stats("stats").unwrap().entry_count, 0);
    }

    #[test]
    fn test_stats_reflect_cache_activity() {
        let (registry, estatisticas, _) = registry_with_caches();
        estatisticas.insert("total".to_string(), 1000, DAY);
        estatisticas.get(&"total".to_string());
        estatisticas.get(&"missing".to_string());

        let stats = registry.stats("estatisticas").unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);

        let all = registry.all_stats();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "distribuicao_uf");
        assert_eq!(all[1].name, "estatisticas");
    }

    #[test]
    fn test_stats_unknown_cache() {
        let (registry, _, _) = registry_with_caches();
        assert!(registry.stats("acima_media").is_none());
        assert!(registry.invalidate("acima_media").is_none());
    }

    #[test]
    fn test_invalidate_one_cache() {
        let (registry, estatisticas, distribuicao) = registry_with_caches();
        estatisticas.insert("total".to_string(), 1000, DAY);
        distribuicao.insert("SP", 0.4, DAY);

        assert_eq!(registry.invalidate("estatisticas"), Some(1));
        assert!(estatisticas.is_empty());
        assert_eq!(distribuicao.len(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let (registry, estatisticas, distribuicao) = registry_with_caches();
        estatisticas.insert("total".to_string(), 1000, DAY);
        distribuicao.insert("SP", 0.4, DAY);
        distribuicao.insert("RJ", 0.2, DAY);

        assert_eq!(registry.invalidate_all(), 3);
        assert!(estatisticas.is_empty());
        assert!(distribuicao.is_empty());
    }
}
