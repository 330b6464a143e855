//! Capability trait for count-bounded caches.
//!
//! [`BoundedCache`] captures the operation set of a conventional bounded LRU
//! cache (add/get/peek plus oldest-entry access, enumeration, purge and
//! resize) so that [`Cache`](crate::cache::Cache) can stand in for other
//! implementations with the same surface, and so that generic code can accept
//! any of them.
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │              BoundedCache<K, V>              │
//!   │                                              │
//!   │  writes:   add, contains_or_add              │
//!   │  reads:    get, peek, contains, get_oldest   │
//!   │  removal:  remove, remove_oldest, purge      │
//!   │  shape:    len, is_empty, keys, values,      │
//!   │            resize                            │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! All methods take `&self`: implementors are expected to provide interior
//! mutability (for [`Cache`](crate::cache::Cache), a mutex around the
//! engine). TTL-specific operations such as explicit per-call TTLs and
//! lazy-expiry maintenance stay on the concrete cache type; this trait is
//! only the lowest-common-denominator bounded-cache surface.

/// Operation set of a count-bounded cache.
///
/// # Example
///
/// ```
/// use expirable::{BoundedCache, Cache};
///
/// fn warm<C: BoundedCache<u64, String>>(cache: &C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.add(*key, value.clone());
///     }
/// }
///
/// let cache: Cache<u64, String> = Cache::new().with_max_keys(100);
/// warm(&cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait BoundedCache<K, V> {
    /// Inserts a key-value pair under the cache-wide default TTL.
    ///
    /// Returns `true` if the insertion pushed the cache over its size cap and
    /// evicted the oldest entry.
    fn add(&self, key: K, value: V) -> bool;

    /// Returns the live value stored under `key`, recording a hit or miss.
    ///
    /// An expired entry is reported as absent (a miss) but stays in the
    /// cache. Under LRU eviction a hit moves the entry to the most-recent
    /// position.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns the live value stored under `key` without updating recency or
    /// statistics.
    fn peek(&self, key: &K) -> Option<V>;

    /// Checks key membership without consulting expiration.
    fn contains(&self, key: &K) -> bool;

    /// Checks membership and, if absent, inserts under the default TTL.
    ///
    /// Returns `(found, evicted)`: `(true, false)` when the key was already
    /// present, otherwise `(false, flag)` where `flag` reports whether the
    /// insertion evicted the oldest entry to hold the size cap.
    fn contains_or_add(&self, key: K, value: V) -> (bool, bool);

    /// Removes `key`, returning whether anything was removed.
    fn remove(&self, key: &K) -> bool;

    /// Removes and returns the oldest entry, or `None` when empty.
    fn remove_oldest(&self) -> Option<(K, V)>;

    /// Returns the oldest entry without removing it or touching recency.
    fn get_oldest(&self) -> Option<(K, V)>;

    /// Current number of entries, expired ones included.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from oldest to newest. Expired entries are not filtered.
    fn keys(&self) -> Vec<K>;

    /// Values from oldest to newest. Expired entries are not filtered.
    fn values(&self) -> Vec<V>;

    /// Removes every entry.
    fn purge(&self);

    /// Changes the size cap, evicting oldest entries down to the new cap.
    ///
    /// Returns the number of entries removed by this call. A cap of 0 means
    /// unlimited and removes nothing.
    fn resize(&self, max_keys: usize) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;

    // Compile-time check that the concrete cache satisfies the surface.
    fn assert_bounded<C: BoundedCache<String, String>>(_cache: &C) {}

    #[test]
    fn cache_implements_bounded_cache() {
        let cache: Cache<String, String> = Cache::new();
        assert_bounded(&cache);
    }

    #[test]
    fn generic_access_through_trait() {
        let cache: Cache<u32, &str> = Cache::new().with_max_keys(2);
        let c: &dyn BoundedCache<u32, &str> = &cache;

        assert!(!c.add(1, "one"));
        assert!(!c.add(2, "two"));
        assert!(c.add(3, "three"));

        assert_eq!(c.len(), 2);
        assert!(!c.contains(&1));
        assert_eq!(c.keys(), vec![2, 3]);
    }
}
