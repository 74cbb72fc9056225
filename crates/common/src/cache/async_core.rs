//! Async cache implementation with configurable eviction policies and TTL
//! support.
//!
//! This module provides an async variant of the cache that uses
//! `tokio::sync::RwLock` for concurrent access in async contexts. It shares
//! configuration and metrics types with the synchronous cache implementation.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::config::{CacheConfig, EvictionPolicy};
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::Clock;

/// Internal storage entry with metadata for cache management.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: std::time::Instant,
    last_accessed: std::time::Instant,
    access_count: u64,
    insertion_order: u64,
}

/// Internal storage structure for the async cache.
#[derive(Debug)]
struct CacheStorage<K, V>
where
    K: Eq + Hash,
{
    data: HashMap<K, CacheEntry<V>>,
    insertion_counter: u64,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash,
{
    fn new() -> Self {
        Self { data: HashMap::new(), insertion_counter: 0 }
    }
}

/// Async cache with configurable eviction policies and TTL support.
///
/// Uses `tokio::sync::RwLock` for async concurrent access. All access methods
/// are async and must be awaited.
///
/// # Type Parameters
///
/// * `K` - Key type (must implement `Eq + Hash + Clone`)
/// * `V` - Value type (must implement `Clone`)
/// * `C` - Clock type for time operations (defaults to `SystemClock`)
///
/// # Examples
///
/// ```
/// use oauthbroker_common::cache::{AsyncCache, CacheConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let cache: AsyncCache<String, i32> = AsyncCache::new(CacheConfig::lru(100));
///
///     cache.insert("key".to_string(), 42).await;
///     assert_eq!(cache.get(&"key".to_string()).await, Some(42));
/// }
/// ```
#[allow(clippy::type_complexity)]
pub struct AsyncCache<K, V, C = crate::resilience::SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> AsyncCache<K, V, crate::resilience::SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a new async cache with the specified configuration and default
    /// system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, crate::resilience::SystemClock)
    }
}

impl<K, V, C> AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Creates a new async cache with the specified configuration and clock.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::new(),
            clock,
        }
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// If the cache is at capacity, evicts entries according to the eviction
    /// policy. If TTL is configured, the entry will expire after the
    /// specified duration.
    pub async fn insert(&self, key: K, value: V) {
        let now = self.clock.now();

        let mut storage = self.storage.write().await;

        // Check if we need to evict before inserting
        if let Some(max_size) = self.config.max_size {
            if storage.data.len() >= max_size && !storage.data.contains_key(&key) {
                self.evict_one(&mut storage).await;
            }
        }

        let entry = CacheEntry {
            value,
            inserted_at: now,
            last_accessed: now,
            access_count: 1,
            insertion_order: storage.insertion_counter,
        };

        storage.insertion_counter += 1;
        storage.data.insert(key, entry);
        self.metrics.record_insert();
    }

    /// Retrieves a value from the cache by key.
    ///
    /// Returns `None` if the key doesn't exist or the entry has expired.
    /// Updates access metadata for LRU/LFU eviction policies.
    pub async fn get(&self, key: &K) -> Option<V> {
        // First check if expired without holding write lock
        {
            let storage = self.storage.read().await;
            if let Some(entry) = storage.data.get(key) {
                if self.is_expired(entry) {
                    drop(storage);
                    let mut storage = self.storage.write().await;
                    storage.data.remove(key);
                    self.metrics.record_expiration();
                    self.metrics.record_miss();
                    return None;
                }
            } else {
                self.metrics.record_miss();
                return None;
            }
        }

        // Now update access metadata
        let now = self.clock.now();
        let mut storage = self.storage.write().await;
        if let Some(entry) = storage.data.get_mut(key) {
            entry.last_accessed = now;
            entry.access_count += 1;
            let value = entry.value.clone();
            self.metrics.record_hit();
            Some(value)
        } else {
            self.metrics.record_miss();
            None
        }
    }

    /// Gets a value or inserts it using the provided function if not present.
    ///
    /// This is useful for lazy initialization of cache values.
    pub async fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key).await {
            return value;
        }

        let value = f();
        self.insert(key, value.clone()).await;
        value
    }

    /// Gets a value or inserts it using the provided async function if not
    /// present.
    ///
    /// This is useful for lazy initialization of cache values with async
    /// operations.
    pub async fn get_or_insert_with_async<F, Fut>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = V>,
    {
        if let Some(value) = self.get(&key).await {
            return value;
        }

        let value = f().await;
        self.insert(key, value.clone()).await;
        value
    }

    /// Removes and returns a value from the cache.
    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write().await;
        storage.data.remove(key).map(|entry| entry.value)
    }

    /// Checks if a key exists in the cache and is not expired.
    pub async fn contains_key(&self, key: &K) -> bool {
        let storage = self.storage.read().await;
        if let Some(entry) = storage.data.get(key) {
            !self.is_expired(entry)
        } else {
            false
        }
    }

    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        let storage = self.storage.read().await;
        storage.data.len()
    }

    /// Returns `true` if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        let storage = self.storage.read().await;
        storage.data.is_empty()
    }

    /// Clears all entries from the cache.
    pub async fn clear(&self) {
        let mut storage = self.storage.write().await;
        storage.data.clear();
    }

    /// Removes all expired entries and returns the count of removed entries.
    pub async fn cleanup_expired(&self) -> usize {
        let mut storage = self.storage.write().await;

        let keys_to_remove: Vec<K> = storage
            .data
            .iter()
            .filter(|(_, entry)| self.is_expired(entry))
            .map(|(k, _)| k.clone())
            .collect();

        let count = keys_to_remove.len();
        for key in keys_to_remove {
            storage.data.remove(&key);
            self.metrics.record_expiration();
        }

        count
    }

    /// Returns current cache statistics.
    ///
    /// Note: This method uses a non-blocking read. If the lock is currently
    /// held, the size will be reported as 0 in the snapshot.
    pub fn stats(&self) -> CacheStats {
        let size = self.storage.try_read().map(|s| s.data.len()).unwrap_or(0);
        self.metrics.snapshot(size, self.config.max_size)
    }

    /// Checks if an entry has expired based on TTL configuration.
    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        if let Some(ttl) = self.config.ttl {
            let now = self.clock.now();
            let age = now.duration_since(entry.inserted_at);
            age > ttl
        } else {
            false
        }
    }

    /// Evicts a single entry based on the configured eviction policy.
    async fn evict_one(&self, storage: &mut CacheStorage<K, V>) {
        if storage.data.is_empty() {
            return;
        }

        let key_to_evict = match self.config.eviction_policy {
            EvictionPolicy::LRU => {
                // Find least recently used
                storage
                    .data
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_accessed)
                    .map(|(k, _)| k.clone())
            }
            EvictionPolicy::LFU => {
                // Find least frequently used
                storage
                    .data
                    .iter()
                    .min_by_key(|(_, entry)| entry.access_count)
                    .map(|(k, _)| k.clone())
            }
            EvictionPolicy::FIFO => {
                // Find oldest insertion
                storage
                    .data
                    .iter()
                    .min_by_key(|(_, entry)| entry.insertion_order)
                    .map(|(k, _)| k.clone())
            }
            EvictionPolicy::Random => {
                // Pick random key
                use rand::seq::IteratorRandom;
                let mut rng = rand::thread_rng();
                storage.data.keys().choose(&mut rng).cloned()
            }
            EvictionPolicy::None => None,
        };

        if let Some(key) = key_to_evict {
            storage.data.remove(&key);
            self.metrics.record_eviction();
        }
    }
}

impl<K, V, C> Clone for AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
