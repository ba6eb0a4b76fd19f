//! Key-value query cache with explicit invalidation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use tokio::sync::RwLock;
use tracing::debug;

/// A TTL-less cache of query results.
///
/// Entries live until they are invalidated. Every invalidation advances a
/// generation counter; a fetch started under an older generation still returns
/// its value to the caller but does not populate the cache, so a read racing a
/// mutation can never pin a pre-mutation value.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    inner: RwLock<Inner<K, V>>,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, V>,
    generation: u64,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.read().await.entries.get(key).cloned()
    }

    /// Stores `value` under `key`.
    pub async fn insert(&self, key: K, value: V) {
        self.inner.write().await.entries.insert(key, value);
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Errors are returned as-is and never cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let generation = {
            let inner = self.inner.read().await;
            if let Some(value) = inner.entries.get(&key) {
                debug!(?key, "query cache hit");
                return Ok(value.clone());
            }
            inner.generation
        };

        debug!(?key, "query cache miss");
        let value = fetch().await?;

        let mut inner = self.inner.write().await;
        if inner.generation == generation {
            inner.entries.insert(key, value.clone());
        } else {
            debug!(?key, "invalidated while fetching, not caching");
        }
        Ok(value)
    }

    /// Drops the entry for `key`. Returns true if an entry was cached.
    pub async fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let removed = inner.entries.remove(key).is_some();
        debug!(?key, removed, "query invalidated");
        removed
    }

    /// Drops every entry whose key matches `predicate`. Returns how many were dropped.
    pub async fn invalidate_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !predicate(key));
        before - inner.entries.len()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.entries.clear();
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
