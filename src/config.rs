//! Cache configuration: eviction policy selection and the no-eviction TTL
//! sentinel.
//!
//! Configuration is applied between construction and first use via the
//! chained `with_*` methods on [`Cache`](crate::cache::Cache) and
//! [`CacheCore`](crate::cache::CacheCore); there is no separate options
//! bundle. Reconfiguring a cache that already holds entries is not supported.

use std::time::Duration;

/// Default TTL applied when none is configured: ten years.
///
/// Entries written under this sentinel effectively never expire, and the
/// opportunistic oldest-entry trim during writes is skipped entirely. A cache
/// left at this default with `max_keys == 0` never removes anything on its
/// own.
pub const NO_EVICTION_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Eviction discipline for the recency list.
///
/// The policy decides what "oldest" means when the cache is over capacity:
///
/// | Policy | Ordered by | Reads reorder? |
/// |--------|------------|----------------|
/// | `Lrc`  | insertion  | no             |
/// | `Lru`  | access     | yes            |
///
/// Writes move an entry to the most-recent position under both policies; a
/// successful [`get`](crate::cache::Cache::get) does so only under `Lru`.
///
/// # Example
///
/// ```
/// use expirable::{Cache, EvictionPolicy};
/// use std::time::Duration;
///
/// let cache: Cache<&str, u32> = Cache::new().with_max_keys(2);
/// assert_eq!(cache.policy(), EvictionPolicy::Lrc);
///
/// let lru: Cache<&str, u32> = Cache::new().with_lru();
/// assert_eq!(lru.policy(), EvictionPolicy::Lru);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvictionPolicy {
    /// Least Recently Created: evict by insertion order. The default.
    #[default]
    Lrc,
    /// Least Recently Used: evict by access order.
    Lru,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_lrc() {
        assert_eq!(EvictionPolicy::default(), EvictionPolicy::Lrc);
    }

    #[test]
    fn no_eviction_ttl_is_ten_years() {
        assert_eq!(NO_EVICTION_TTL.as_secs(), 10 * 365 * 24 * 60 * 60);
    }
}
