//! Read-through TTL cache for upstream collaborators.
//!
//! The cache is constructed by the caller and injected where needed. Entries
//! expire on read once their TTL has elapsed, and the map never holds more
//! than its configured number of entries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::collaborator::SectionAnalyzer;
use crate::domain::Section;
use crate::error::Result;
use crate::validator::ValidatedMetrics;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Upper bound on entries when the caller has no better figure.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Key/value cache whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<K, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    /// Create an empty cache holding at most `max_entries` entries.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Configured time to live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Maximum number of stored entries.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Return a live entry, evicting it if it has expired.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() >= self.ttl,
            None => {
                self.misses += 1;
                return None;
            }
        };
        if expired {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }
        self.hits += 1;
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any previous entry.
    ///
    /// Expired entries are purged first; if the cache is still full the
    /// oldest entry is evicted.
    pub fn insert(&mut self, key: K, value: V) {
        self.purge_expired();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the cached value or compute, store and return a fresh one.
    ///
    /// Errors from `load` are returned and never cached.
    pub fn get_or_try_insert_with<F>(&mut self, key: K, load: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = load()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Number of stored entries, including ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that found nothing live.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// A cache shared between collaborators.
pub type SharedCache<V> = Arc<Mutex<TtlCache<String, V>>>;

/// Create a shared cache with the given TTL and entry bound.
pub fn shared_cache<V: Clone>(ttl: Duration, max_entries: usize) -> SharedCache<V> {
    Arc::new(Mutex::new(TtlCache::new(ttl, max_entries)))
}

fn lock<V>(cache: &SharedCache<V>) -> MutexGuard<'_, TtlCache<String, V>> {
    // A poisoned lock only means another caller panicked mid-update; the
    // map itself is still usable.
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Memoizes another analyzer's scores per scope, product and section.
///
/// The scope names whatever the wrapped analyzer reads besides the metrics,
/// such as the input file it was built from. Analyzers that share a cache
/// must use distinct scopes whenever they can answer differently for the
/// same product.
pub struct CachingAnalyzer<A> {
    inner: A,
    cache: SharedCache<i64>,
    scope: String,
}

impl<A: SectionAnalyzer> CachingAnalyzer<A> {
    /// Wrap an analyzer with a shared cache under `scope`.
    pub fn new(inner: A, cache: SharedCache<i64>, scope: impl Into<String>) -> Self {
        Self {
            inner,
            cache,
            scope: scope.into(),
        }
    }

    fn key(&self, metrics: &ValidatedMetrics) -> String {
        format!(
            "{}|{}|{}|{}",
            self.scope,
            metrics.app_id(),
            metrics.name(),
            self.inner.section()
        )
    }
}

impl<A: SectionAnalyzer> SectionAnalyzer for CachingAnalyzer<A> {
    fn section(&self) -> Section {
        self.inner.section()
    }

    fn analyze(&self, metrics: &ValidatedMetrics) -> Result<i64> {
        let key = self.key(metrics);
        let mut cache = lock(&self.cache);
        cache.get_or_try_insert_with(key, || self.inner.analyze(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::MockSectionAnalyzer;
    use crate::error::LaunchLensError;
    use crate::validator::tests::{raw, valid};

    #[test]
    fn live_entries_are_returned() {
        let mut cache = TtlCache::new(Duration::from_secs(60), DEFAULT_MAX_ENTRIES);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let mut cache = TtlCache::new(Duration::ZERO, DEFAULT_MAX_ENTRIES);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_drops_expired_entries() {
        let mut cache = TtlCache::new(Duration::ZERO, DEFAULT_MAX_ENTRIES);
        cache.insert(1u32, "x".to_string());
        cache.insert(2u32, "y".to_string());
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn load_errors_are_not_cached() {
        let mut cache: TtlCache<String, i64> =
            TtlCache::new(Duration::from_secs(60), DEFAULT_MAX_ENTRIES);
        let failed = cache.get_or_try_insert_with("k".to_string(), || {
            Err(LaunchLensError::Other("down".to_string()))
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let loaded = cache.get_or_try_insert_with("k".to_string(), || Ok(7));
        assert_eq!(loaded.expect("value"), 7);
        let cached = cache.get_or_try_insert_with("k".to_string(), || Ok(9));
        assert_eq!(cached.expect("value"), 7);
    }

    #[test]
    fn caching_analyzer_calls_inner_once_per_product() {
        let mut inner = MockSectionAnalyzer::new();
        inner
            .expect_section()
            .return_const(Section::StorePage);
        inner.expect_analyze().times(1).returning(|_| Ok(72));

        let cache = shared_cache(Duration::from_secs(60), DEFAULT_MAX_ENTRIES);
        let analyzer = CachingAnalyzer::new(inner, cache.clone(), "starfall.json");
        let metrics = valid(&raw(5000.0, 10, 50, 85.0, 1000));

        assert_eq!(analyzer.analyze(&metrics).expect("score"), 72);
        assert_eq!(analyzer.analyze(&metrics).expect("score"), 72);
        assert_eq!(analyzer.section(), Section::StorePage);

        let guard = cache.lock().expect("lock");
        assert_eq!(guard.len(), 1);
        assert_eq!(guard.hits(), 1);
    }

    #[test]
    fn insert_evicts_oldest_when_full() {
        let mut cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b".to_string(), 2);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), Some(2));
        assert_eq!(cache.get(&"c".to_string()), Some(3));

        cache.insert("b".to_string(), 20);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"c".to_string()), Some(3));
    }

    #[test]
    fn insert_purges_expired_entries() {
        let mut cache = TtlCache::new(Duration::ZERO, 8);
        for key in 0u32..5 {
            cache.insert(key, key);
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(TtlCache::<u32, u32>::new(Duration::ZERO, 0).max_entries(), 1);
    }

    #[test]
    fn scopes_keep_same_product_apart() {
        let cache = shared_cache(Duration::from_secs(60), DEFAULT_MAX_ENTRIES);
        let scored = |value: i64| {
            let mut inner = MockSectionAnalyzer::new();
            inner.expect_section().return_const(Section::StorePage);
            inner.expect_analyze().times(1).returning(move |_| Ok(value));
            inner
        };
        let first = CachingAnalyzer::new(scored(100), cache.clone(), "a.json");
        let second = CachingAnalyzer::new(scored(0), cache.clone(), "b.json");
        let mut anonymous = raw(5000.0, 10, 50, 85.0, 1000);
        anonymous.name = String::new();
        anonymous.app_id = String::new();
        let metrics = valid(&anonymous);

        assert_eq!(first.analyze(&metrics).expect("score"), 100);
        assert_eq!(second.analyze(&metrics).expect("score"), 0);
        assert_eq!(first.analyze(&metrics).expect("score"), 100);
        assert_eq!(cache.lock().expect("lock").len(), 2);
    }
}
