//! expirable: a TTL-aware cache with LRC and LRU eviction.
//!
//! The cache couples a keyed index with a recency-ordered list. Entries carry
//! an absolute expiration instant; the size may be capped by key count and
//! enforced with either Least-Recently-Created (default) or
//! Least-Recently-Used eviction. The crate is thread-safe and spawns no
//! threads of its own: expiry is lazy. On every [`Cache::set`] the single
//! oldest entry is dropped if it has expired, and with `max_keys` configured
//! the oldest entry is dropped regardless of expiry to hold the size. With
//! the default TTL (ten years) and default `max_keys` (0, unlimited) the
//! cache never removes entries on its own.
//!
//! The only reliable way to keep expired entries from lingering is to call
//! [`Cache::delete_expired`] periodically, e.g. from a timer at half the TTL.
//!
//! ## Module Map
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`cache`]  | [`Cache`] (thread-safe handle) and [`CacheCore`] engine  |
//! | [`config`] | [`EvictionPolicy`], [`NO_EVICTION_TTL`]                  |
//! | [`stats`]  | [`Stats`] counters snapshot                              |
//! | [`traits`] | [`BoundedCache`] capability trait                        |
//! | [`error`]  | [`error::InvariantError`] diagnostics                    |
//!
//! ## Example
//!
//! ```
//! use expirable::Cache;
//! use std::time::Duration;
//!
//! // Three keys at most, entries live for five minutes by default.
//! let cache: Cache<String, String> = Cache::new()
//!     .with_max_keys(3)
//!     .with_ttl(Duration::from_secs(300));
//!
//! // Zero TTL on a write means "use the cache-wide default".
//! cache.set("key1".to_string(), "val1".to_string(), Duration::ZERO);
//! assert_eq!(cache.get(&"key1".to_string()), Some("val1".to_string()));
//!
//! // A per-call TTL overrides the default for that entry only.
//! cache.set("key2".to_string(), "val2".to_string(), Duration::from_secs(5));
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! [`Cache`] is `Clone + Send + Sync`; clones share one underlying engine
//! guarded by a single mutex. Every operation locks on entry and unlocks on
//! return, so all operations are linearizable. The eviction callback runs
//! under that lock: re-entering the cache from inside the callback deadlocks.

pub mod cache;
pub mod config;
pub mod error;
pub mod stats;
pub mod traits;

pub use cache::{Cache, CacheCore};
pub use config::{EvictionPolicy, NO_EVICTION_TTL};
pub use stats::Stats;
pub use traits::BoundedCache;
