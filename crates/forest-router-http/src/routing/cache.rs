//! Bounded least-recently-used memo of lookup results.
//!
//! [`RouteCache`] is a thin wrapper over [`lru::LruCache`] keyed by the raw
//! request path. It is never authoritative: the router clears or deletes
//! entries whenever registrations change what a path would resolve to.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;

/// A fixed-capacity LRU store from request path to a cached value.
pub struct RouteCache<V> {
    inner: LruCache<String, V>,
}

impl<V> fmt::Debug for RouteCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteCache")
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.cap())
            .finish()
    }
}

impl<V> RouteCache<V> {
    /// Creates a cache holding at most `capacity` entries. A capacity of zero
    /// is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Returns the cached value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    /// Stores `value` under `key`, evicting the least recently used entry if
    /// the cache is full.
    pub fn set(&mut self, key: &str, value: V) {
        self.inner.put(key.to_string(), value);
    }

    /// Removes `key`. Removing an absent key is a no-op.
    pub fn del(&mut self, key: &str) {
        self.inner.pop(key);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }
}
