//! Manifest cache with time-based eviction.
//!
//! Pack manifests are immutable once loaded, so the process keeps them in a shared
//! key/value cache. The engine talks to the cache only through the [`ManifestCache`]
//! trait (`get` / `set` with a TTL); [`TtlCache`] is the in-process implementation.
//!
//! # Concurrency
//!
//! - **DashMap sharding**: reads never block each other, writes are atomic per key
//! - **No cross-key locking**: manifests are independent values
//! - **Background eviction**: [`TtlCache::spawn_sweeper`] runs on the tokio runtime,
//!   independent of request tasks
//!
//! # Lifecycle
//!
//! The cache is created once at service startup, shared through `Arc`, and flushed
//! with [`TtlCache::shutdown`] at exit:
//!
//! ```rust,no_run
//! use qagen_cli::cache::TtlCache;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let cache: Arc<TtlCache> = Arc::new(TtlCache::new());
//! cache.spawn_sweeper(Duration::from_secs(60));
//! // ... serve requests ...
//! cache.shutdown();
//! # }
//! ```

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::pack::TemplatePackManifest;

/// Failure reported by a cache backend.
#[derive(Error, Debug, Clone)]
#[error("{reason}")]
pub struct CacheError {
    /// Why the backend could not serve the request
    pub reason: String,
}

impl CacheError {
    /// Create a cache error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Key/value collaborator backing manifest storage.
///
/// Both operations are synchronous from the engine's point of view. Implementations
/// backed by remote stores report outages as [`CacheError`]; the pack resolver then
/// loads from the store directly.
pub trait ManifestCache: Send + Sync {
    /// Fetch a live entry, `Ok(None)` on a miss or an expired entry.
    fn get(&self, key: &str) -> Result<Option<Arc<TemplatePackManifest>>, CacheError>;

    /// Store an entry for `ttl`.
    fn set(
        &self,
        key: &str,
        value: Arc<TemplatePackManifest>,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past the clock's range
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Hit/miss counters and current size of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from a live entry
    pub hits: usize,
    /// Lookups that found nothing or an expired entry
    pub misses: usize,
    /// Entries currently held (live or not yet swept)
    pub entries: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Concurrent in-process cache with per-entry TTL.
#[derive(Debug)]
pub struct TtlCache<V = Arc<TemplatePackManifest>> {
    entries: DashMap<String, CacheEntry<V>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            sweeper: Mutex::new(None),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a clone of a live entry.
    ///
    /// Expired entries are treated as absent even before the sweeper removes them.
    pub fn get_entry(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let live = self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());

        if live.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        live
    }

    /// Insert or replace an entry.
    ///
    /// A TTL too large for the monotonic clock keeps the entry until it is
    /// invalidated or the cache is flushed.
    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at,
            },
        );
    }

    /// Remove an entry, returning whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    /// Start the background eviction task on the current tokio runtime.
    ///
    /// The task holds only a weak reference and exits once the cache is dropped.
    /// Calling this again replaces the previous task.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let evicted = cache.evict_expired();
                if evicted > 0 {
                    tracing::debug!("Evicted {} expired cache entries", evicted);
                }
            }
        });

        if let Ok(mut slot) = self.sweeper.lock()
            && let Some(previous) = slot.replace(handle)
        {
            previous.abort();
        }
    }

    /// Stop the sweeper and flush all entries.
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.sweeper.lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
        }
        self.entries.clear();
        tracing::debug!("Manifest cache flushed");
    }
}

impl ManifestCache for TtlCache<Arc<TemplatePackManifest>> {
    fn get(&self, key: &str) -> Result<Option<Arc<TemplatePackManifest>>, CacheError> {
        Ok(self.get_entry(key))
    }

    fn set(
        &self,
        key: &str,
        value: Arc<TemplatePackManifest>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.insert(key, value, ttl);
        Ok(())
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.sweeper.lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get_entry("a").is_none());

        cache.insert("a", "one".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get_entry("a").as_deref(), Some("one"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.insert("gone", 1, Duration::ZERO);
        cache.insert("kept", 2, Duration::from_secs(60));

        assert!(cache.get_entry("gone").is_none());
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.stats().entries, 1);
        assert_eq!(cache.get_entry("kept"), Some(2));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.insert("k", 1, Duration::MAX);
        assert_eq!(cache.get_entry("k"), Some(1));
        assert_eq!(cache.evict_expired(), 0);
        assert!(cache.invalidate("k"));
    }

    #[test]
    fn test_invalidate() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.insert("k", 1, Duration::from_secs(60));
        assert!(cache.invalidate("k"));
        assert!(!cache.invalidate("k"));
    }

    #[tokio::test]
    async fn test_sweeper_evicts_in_background() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        cache.insert("short", 1, Duration::from_millis(5));
        cache.spawn_sweeper(Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.stats().entries, 0);

        cache.shutdown();
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache: Arc<TtlCache<usize>> = Arc::new(TtlCache::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let key = format!("key-{}", i % 4);
                cache.insert(key.clone(), i, Duration::from_secs(60));
                cache.get_entry(&key).is_some()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(cache.stats().entries, 4);
    }
}
