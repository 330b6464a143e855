//! Hit/miss and churn counters.
//!
//! Every cache carries a [`Stats`] record updated under the engine lock:
//! `hits`/`misses` count [`get`](crate::cache::Cache::get) outcomes (an
//! expired entry counts as a miss), `added` counts fresh-key writes (updates
//! do not count), and `evicted` counts every entry destruction regardless of
//! cause: expiry, size pressure, explicit removal, resize shrinkage or purge.
//!
//! Over the lifetime of a cache, `added - evicted` equals the current entry
//! count.

use std::fmt;

/// Snapshot of the cache counters.
///
/// Returned by value from [`Cache::stats`](crate::cache::Cache::stats);
/// the cache keeps counting after the snapshot is taken.
///
/// # Example
///
/// ```
/// use expirable::Cache;
/// use std::time::Duration;
///
/// let cache: Cache<&str, u32> = Cache::new();
/// cache.set("a", 1, Duration::ZERO);
/// cache.get(&"a");
/// cache.get(&"missing");
///
/// let stats = cache.stats();
/// assert_eq!(stats.hits, 1);
/// assert_eq!(stats.misses, 1);
/// assert_eq!(stats.added, 1);
/// assert_eq!(stats.evicted, 0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Lookups that returned a live value.
    pub hits: u64,
    /// Lookups that found nothing, or found only an expired entry.
    pub misses: u64,
    /// Entries created by writes. Overwriting an existing key does not count.
    pub added: u64,
    /// Entries destroyed, for any reason.
    pub evicted: u64,
}

impl Stats {
    /// Fraction of lookups that hit, in `[0.0, 1.0]`.
    ///
    /// With no lookups recorded this is `NaN`, which the `Display` rendering
    /// of the cache passes through as-is.
    pub fn hit_ratio(&self) -> f64 {
        self.hits as f64 / (self.hits + self.misses) as f64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Hits:{} Misses:{} Added:{} Evicted:{}}}",
            self.hits, self.misses, self.added, self.evicted
        )
    }
}
