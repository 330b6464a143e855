//! TTL-aware cache engine: a keyed index and a recency list evolving together
//! under one lock.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                           Cache<K, V>                             │
//!   │                                                                   │
//!   │   ┌───────────────────────────────────────────────────────────┐   │
//!   │   │              Arc<parking_lot::Mutex<CacheCore>>           │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   │                               │                                   │
//!   │                               ▼                                   │
//!   │   ┌───────────────────────────────────────────────────────────┐   │
//!   │   │                     CacheCore<K, V>                       │   │
//!   │   │                                                           │   │
//!   │   │   FxHashMap<K, NonNull<Node>>     (index)                 │   │
//!   │   │        │                                                  │   │
//!   │   │        ▼                                                  │   │
//!   │   │   head ──► [new] ◄──► [..] ◄──► [old] ◄── tail            │   │
//!   │   │   (most recent)                 (oldest, evicted first)   │   │
//!   │   │                                                           │   │
//!   │   │   Stats { hits, misses, added, evicted }                  │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! | Component        | Description                                          |
//! |------------------|------------------------------------------------------|
//! | `CacheCore<K,V>` | Single-threaded engine: index + list + counters      |
//! | `Cache<K,V>`     | Cloneable thread-safe handle around one engine       |
//! | `Node<K,V>`      | Heap entry: links, key, value, expiration instant    |
//!
//! ## Recency and Eviction
//!
//! The list position encodes recency: writes always move an entry to the
//! front; successful reads do so only under
//! [`EvictionPolicy::Lru`](crate::config::EvictionPolicy). Size pressure and
//! expiry both remove from the back, through a single eviction routine that
//! unlinks the node, drops the index slot, bumps the `evicted` counter and
//! invokes the user callback.
//!
//! ## Lazy Expiry
//!
//! ```text
//!   set(k, v, ttl)                        get(k)
//!   ══════════════════════════════        ═══════════════════════════════
//!   1. insert/update at front             expired entry?
//!   2. ttl configured? check ONE             -> miss, stays in the cache
//!      back node, drop it if expired      live entry?
//!   3. over max_keys? drop back node         -> hit (+ promote under LRU)
//! ```
//!
//! Expired entries are reported as absent but keep occupying a slot (and
//! count toward [`len`](Cache::len)) until a write trims them, or
//! [`delete_expired`](Cache::delete_expired) / [`purge`](Cache::purge) runs.
//! Nothing here spawns threads; callers wanting strict liveness run
//! `delete_expired` on a timer, typically at half the TTL.
//!
//! ## Safety
//!
//! The list is threaded through raw `NonNull` pointers owned by the engine:
//! every node is allocated in [`CacheCore::set`], reachable from exactly one
//! index slot, and freed either by the eviction routine or by the `Drop`
//! impl. No pointer escapes the engine.

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{EvictionPolicy, NO_EVICTION_TTL};
use crate::error::InvariantError;
use crate::stats::Stats;
use crate::traits::BoundedCache;

/// Hook invoked with the key and value of every removed entry.
///
/// Runs while the engine lock is held: the borrows are valid only for the
/// duration of the call, and re-entering the cache from the hook deadlocks.
pub type EvictionCallback<K, V> = Box<dyn FnMut(&K, &V) + Send>;

/// Node in the recency list.
///
/// Links first for traversal locality; the key is kept in the node so the
/// index slot can be dropped during eviction without a reverse lookup.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    expires_at: Instant,
    key: K,
    value: V,
}

impl<K, V> Node<K, V> {
    #[inline]
    fn expired_at(&self, now: Instant) -> bool {
        // Strict: an entry observed exactly at its expiry instant is valid.
        now > self.expires_at
    }
}

/// Single-threaded cache engine.
///
/// Owns the index, the recency list and the counters; every operation keeps
/// the three consistent. For shared access use [`Cache`], which wraps one
/// engine in a mutex.
///
/// # Example
///
/// ```
/// use expirable::CacheCore;
/// use std::time::Duration;
///
/// let mut core: CacheCore<&str, u32> = CacheCore::new().with_max_keys(2);
/// core.set("a", 1, Duration::ZERO);
/// core.set("b", 2, Duration::ZERO);
/// core.set("c", 3, Duration::ZERO); // evicts "a"
///
/// assert_eq!(core.len(), 2);
/// assert!(!core.contains(&"a"));
/// assert_eq!(core.keys(), vec!["b", "c"]);
/// ```
pub struct CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    ttl: Duration,
    max_keys: usize,
    policy: EvictionPolicy,
    on_evicted: Option<EvictionCallback<K, V>>,
    // False once any write used a TTL other than the cache default; the
    // back-to-front expiry order assumed by the delete_expired early exit no
    // longer holds after that.
    uniform_ttl: bool,
    stats: Stats,
}

// SAFETY: the raw pointers only reference heap nodes owned by this struct,
// and the eviction callback is required to be Send by its type.
unsafe impl<K, V> Send for CacheCore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

// SAFETY: shared references only permit read-only traversal of the node
// chain; every mutation, including the callback invocation, requires &mut.
unsafe impl<K, V> Sync for CacheCore<K, V>
where
    K: Eq + Hash + Clone + Sync,
    V: Sync,
{
}

impl<K, V> CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty engine: unlimited keys, ten-year default TTL, LRC
    /// eviction, no callback.
    pub fn new() -> Self {
        CacheCore {
            map: FxHashMap::default(),
            head: None,
            tail: None,
            ttl: NO_EVICTION_TTL,
            max_keys: 0,
            policy: EvictionPolicy::Lrc,
            on_evicted: None,
            uniform_ttl: true,
            stats: Stats::default(),
        }
    }

    /// Sets the default TTL applied when a write passes a zero TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Caps the number of entries; 0 means unlimited.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Switches eviction from LRC to LRU.
    pub fn with_lru(mut self) -> Self {
        self.policy = EvictionPolicy::Lru;
        self
    }

    /// Installs a hook called once per removed entry, for any removal cause.
    pub fn with_on_evicted<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&K, &V) + Send + 'static,
    {
        self.on_evicted = Some(Box::new(hook));
        self
    }

    /// Writes `value` under `key` with a per-call TTL; `Duration::ZERO` means
    /// "use the cache-wide default". It never means "expire immediately".
    ///
    /// A fresh key lands at the front of the recency list and bumps `added`.
    /// An existing key has its value and expiration overwritten and is moved
    /// to the front under both eviction policies; nothing is counted.
    ///
    /// After inserting a fresh key the engine does its lazy maintenance:
    /// if a TTL is configured, the single oldest entry is dropped when
    /// expired; then, with `max_keys` set, the oldest entry is dropped if the
    /// size now exceeds the cap. Returns `true` iff that size-cap eviction
    /// happened.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) -> bool {
        let now = Instant::now();
        let effective_ttl = if ttl == Duration::ZERO { self.ttl } else { ttl };
        if ttl != Duration::ZERO && ttl != self.ttl {
            self.uniform_ttl = false;
        }

        if let Some(&ptr) = self.map.get(&key) {
            self.detach(ptr);
            self.push_front(ptr);
            unsafe {
                let node = &mut *ptr.as_ptr();
                node.value = value;
                node.expires_at = now + effective_ttl;
            }
            return false;
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            expires_at: now + effective_ttl,
            key: key.clone(),
            value,
        });
        let ptr = NonNull::from(Box::leak(node));
        self.map.insert(key, ptr);
        self.push_front(ptr);
        self.stats.added += 1;

        // One back node per write; full draining is delete_expired's job.
        if effective_ttl != NO_EVICTION_TTL {
            self.remove_oldest_if_expired(now);
        }

        if self.max_keys > 0 && self.map.len() > self.max_keys {
            if let Some(tail) = self.tail {
                self.evict_entry(tail);
            }
            return true;
        }
        false
    }

    /// [`set`](Self::set) under the default TTL. Returns `true` iff the
    /// insertion evicted the oldest entry to hold the size cap.
    pub fn add(&mut self, key: K, value: V) -> bool {
        self.set(key, value, Duration::ZERO)
    }

    /// Returns the live value under `key` and records a hit, or records a
    /// miss when the key is absent or expired.
    ///
    /// An expired entry stays in the cache; it is merely reported as absent.
    /// Under LRU eviction a hit moves the entry to the front.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let ptr = match self.map.get(key) {
            Some(&ptr) => ptr,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if unsafe { ptr.as_ref() }.expired_at(Instant::now()) {
            self.stats.misses += 1;
            return None;
        }

        if self.policy == EvictionPolicy::Lru {
            self.detach(ptr);
            self.push_front(ptr);
        }
        self.stats.hits += 1;
        Some(unsafe { &(*ptr.as_ptr()).value })
    }

    /// Returns the live value under `key` without touching recency order or
    /// statistics. Absent and expired keys both come back as `None`.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &ptr = self.map.get(key)?;
        let node = unsafe { ptr.as_ref() };
        if node.expired_at(Instant::now()) {
            return None;
        }
        Some(&node.value)
    }

    /// Checks index membership. Expiration is not consulted.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Checks membership and, if absent, inserts under the default TTL.
    ///
    /// Atomic with respect to the engine: no other operation can interleave
    /// between the check and the insert. Returns `(found, evicted)` as
    /// described on [`BoundedCache::contains_or_add`].
    pub fn contains_or_add(&mut self, key: K, value: V) -> (bool, bool) {
        if self.map.contains_key(&key) {
            return (true, false);
        }
        let evicted = self.add(key, value);
        (false, evicted)
    }

    /// Removes `key` if present, firing the eviction callback. Returns
    /// whether anything was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&ptr) => {
                self.evict_entry(ptr);
                true
            }
            None => false,
        }
    }

    /// Removes `key` if present. Same as [`remove`](Self::remove) without the
    /// result.
    pub fn invalidate(&mut self, key: &K) {
        self.remove(key);
    }

    /// Removes every entry whose key satisfies the predicate.
    ///
    /// Iteration order is unspecified. The predicate must not touch the
    /// cache.
    pub fn invalidate_fn<F>(&mut self, mut pred: F)
    where
        F: FnMut(&K) -> bool,
    {
        let matched: Vec<_> = self
            .map
            .iter()
            .filter_map(|(key, &ptr)| pred(key).then_some(ptr))
            .collect();
        for ptr in matched {
            self.evict_entry(ptr);
        }
    }

    /// Removes and returns the oldest entry, or `None` when empty.
    pub fn remove_oldest(&mut self) -> Option<(K, V)> {
        let tail = self.tail?;
        Some(self.evict_entry(tail))
    }

    /// Returns the oldest entry without removing it or touching recency.
    pub fn get_oldest(&self) -> Option<(&K, &V)> {
        self.tail.map(|tail| {
            let node = unsafe { tail.as_ref() };
            (&node.key, &node.value)
        })
    }

    /// Keys from oldest to newest by current recency. Expired entries are
    /// included.
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.map.len());
        let mut cur = self.tail;
        while let Some(ptr) = cur {
            let node = unsafe { ptr.as_ref() };
            out.push(node.key.clone());
            cur = node.prev;
        }
        out
    }

    /// Values in the same order as [`keys`](Self::keys).
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.map.len());
        let mut cur = self.tail;
        while let Some(ptr) = cur {
            let node = unsafe { ptr.as_ref() };
            out.push(node.value.clone());
            cur = node.prev;
        }
        out
    }

    /// Current number of entries, expired ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the engine holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Changes `max_keys`, evicting oldest entries until the size fits.
    ///
    /// Returns how many entries this call removed. `resize(0)` lifts the cap
    /// and removes nothing.
    pub fn resize(&mut self, max_keys: usize) -> usize {
        if max_keys == 0 {
            self.max_keys = 0;
            return 0;
        }
        let mut removed = 0;
        while self.map.len() > max_keys {
            match self.tail {
                Some(tail) => {
                    self.evict_entry(tail);
                    removed += 1;
                }
                None => break,
            }
        }
        self.max_keys = max_keys;
        removed
    }

    /// Removes every expired entry.
    ///
    /// Walks the list from the back. Under LRC eviction, while all writes so
    /// far used the cache-default TTL, expiry instants grow from back to
    /// front and the walk stops at the first live node. Under LRU, or after
    /// any per-call TTL override, the whole list is scanned.
    pub fn delete_expired(&mut self) {
        let now = Instant::now();
        let sorted_by_expiry = self.policy == EvictionPolicy::Lrc && self.uniform_ttl;
        let mut cur = self.tail;
        while let Some(ptr) = cur {
            let (prev, expired) = {
                let node = unsafe { ptr.as_ref() };
                (node.prev, node.expired_at(now))
            };
            if expired {
                self.evict_entry(ptr);
            } else if sorted_by_expiry {
                return;
            }
            cur = prev;
        }
    }

    /// Removes every entry, firing the eviction callback and counting each
    /// one as evicted. Idempotent.
    pub fn purge(&mut self) {
        while let Some(tail) = self.tail {
            self.evict_entry(tail);
        }
    }

    /// Snapshot of the counters.
    #[inline]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Expiration instant of a present key, expired or not. No recency or
    /// statistics effect.
    pub fn get_expiration(&self, key: &K) -> Option<Instant> {
        self.map.get(key).map(|&ptr| unsafe { ptr.as_ref() }.expires_at)
    }

    /// Configured eviction policy.
    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Configured size cap; 0 means unlimited.
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Verifies the index/recency-list coupling and the counter ledger.
    ///
    /// Checks that the list is acyclic and exactly as long as the index, that
    /// every node is indexed under its own key, and that
    /// `added - evicted == len`. Used by the test suite; a healthy engine
    /// always returns `Ok`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.head.is_some() != self.tail.is_some() {
            return Err(InvariantError::DetachedEnd);
        }

        let mut count = 0usize;
        let mut cur = self.head;
        while let Some(ptr) = cur {
            let node = unsafe { ptr.as_ref() };
            match self.map.get(&node.key) {
                Some(&mapped) if mapped == ptr => {}
                Some(_) => return Err(InvariantError::MisdirectedSlot),
                None => return Err(InvariantError::UnindexedKey),
            }
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::ListCycle {
                    index_len: self.map.len(),
                });
            }
            cur = node.next;
        }
        if count != self.map.len() {
            return Err(InvariantError::LengthMismatch {
                index_len: self.map.len(),
                list_len: count,
            });
        }

        if self.stats.added.checked_sub(self.stats.evicted) != Some(count as u64) {
            return Err(InvariantError::UnbalancedLedger {
                added: self.stats.added,
                evicted: self.stats.evicted,
                len: count,
            });
        }
        Ok(())
    }

    // -- eviction primitive and list plumbing -----------------------------

    /// Single removal routine used by every destruction path: unlink, drop
    /// the index slot, count the eviction, fire the callback.
    fn evict_entry(&mut self, ptr: NonNull<Node<K, V>>) -> (K, V) {
        self.detach(ptr);
        let node = unsafe { Box::from_raw(ptr.as_ptr()) };
        self.map.remove(&node.key);
        self.stats.evicted += 1;
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }
        (node.key, node.value)
    }

    fn remove_oldest_if_expired(&mut self, now: Instant) {
        if let Some(tail) = self.tail {
            if unsafe { tail.as_ref() }.expired_at(now) {
                self.evict_entry(tail);
            }
        }
    }

    /// Unlink a node from the list without freeing it or touching the index.
    #[inline(always)]
    fn detach(&mut self, ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = ptr.as_ref();
            let prev = node.prev;
            let next = node.next;

            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => self.head = next,
            }
            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => self.tail = prev,
            }
        }
    }

    /// Link a detached node at the front (most recent position).
    #[inline(always)]
    fn push_front(&mut self, mut ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = ptr.as_mut();
            node.prev = None;
            node.next = self.head;

            match self.head {
                Some(mut h) => h.as_mut().prev = Some(ptr),
                None => self.tail = Some(ptr),
            }
            self.head = Some(ptr);
        }
    }

    /// Unlink and reclaim the back node. Used by `Drop`; bypasses the index
    /// and the counters.
    fn pop_back(&mut self) -> Option<Box<Node<K, V>>> {
        self.tail.map(|tail| unsafe {
            let node = Box::from_raw(tail.as_ptr());
            self.tail = node.prev;
            match self.tail {
                Some(mut t) => t.as_mut().next = None,
                None => self.head = None,
            }
            node
        })
    }
}

impl<K, V> Drop for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        // Reclaim the chain; dropping a cache is not an eviction, so no
        // counters and no callback.
        while self.pop_back().is_some() {}
    }
}

impl<K, V> Default for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("len", &self.len())
            .field("max_keys", &self.max_keys)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Renders `Size: {len}, Stats: {counters} ({hit_pct}%)` with the hit
/// percentage to one decimal; with no lookups recorded the percentage reads
/// `NaN`.
impl<K, V> fmt::Display for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        write!(
            f,
            "Size: {}, Stats: {} ({:.1}%)",
            self.len(),
            stats,
            100.0 * stats.hit_ratio()
        )
    }
}

/// Thread-safe, cloneable cache handle.
///
/// Wraps one [`CacheCore`] in a mutex; clones share the same engine. Every
/// operation takes the lock for its whole duration, so operations from any
/// number of threads are linearizable. Lock hold time is O(1) for single-key
/// operations and O(len) for enumeration, predicate invalidation,
/// [`delete_expired`](Self::delete_expired) and [`purge`](Self::purge).
///
/// Configuration chains between construction and first use:
///
/// ```
/// use expirable::Cache;
/// use std::time::Duration;
///
/// let cache: Cache<String, u64> = Cache::new()
///     .with_ttl(Duration::from_millis(50))
///     .with_max_keys(500)
///     .with_lru();
/// cache.set("answer".to_string(), 42, Duration::ZERO);
/// assert_eq!(cache.get(&"answer".to_string()), Some(42));
/// ```
///
/// The eviction callback runs under the engine lock. It must not call back
/// into the cache; doing so deadlocks.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Arc<Mutex<CacheCore<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an unbounded LRC cache with the ten-year default TTL.
    pub fn new() -> Self {
        Cache {
            inner: Arc::new(Mutex::new(CacheCore::new())),
        }
    }

    /// Sets the default TTL applied when a write passes a zero TTL.
    ///
    /// Ten years by default; a sane value for an expirable cache is minutes.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.inner.lock().ttl = ttl;
        self
    }

    /// Caps the number of entries; 0 (the default) means unlimited.
    pub fn with_max_keys(self, max_keys: usize) -> Self {
        self.inner.lock().max_keys = max_keys;
        self
    }

    /// Switches eviction from LRC (insertion order) to LRU (access order).
    pub fn with_lru(self) -> Self {
        self.inner.lock().policy = EvictionPolicy::Lru;
        self
    }

    /// Installs a hook called once for every removed entry, whether the
    /// removal was manual or automatic.
    pub fn with_on_evicted<F>(self, hook: F) -> Self
    where
        F: FnMut(&K, &V) + Send + 'static,
    {
        self.inner.lock().on_evicted = Some(Box::new(hook));
        self
    }

    /// Writes `value` under `key`; zero `ttl` means the cache-wide default.
    ///
    /// See [`CacheCore::set`] for the write-then-maintain sequence.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.inner.lock().set(key, value, ttl);
    }

    /// Writes under the default TTL; returns `true` iff the insertion
    /// evicted the oldest entry to hold the size cap.
    pub fn add(&self, key: K, value: V) -> bool {
        self.inner.lock().add(key, value)
    }

    /// Returns the live value under `key`, counting a hit or a miss.
    ///
    /// Absent and expired keys both return `None`; expired entries stay
    /// cached until trimmed. Under LRU a hit promotes the entry.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns the live value under `key` without updating recency order or
    /// statistics.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Checks index membership without consulting expiration.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Atomically checks membership and inserts when absent; see
    /// [`BoundedCache::contains_or_add`].
    pub fn contains_or_add(&self, key: K, value: V) -> (bool, bool) {
        self.inner.lock().contains_or_add(key, value)
    }

    /// Removes `key`, returning whether anything was removed.
    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().remove(key)
    }

    /// Removes `key` if present.
    pub fn invalidate(&self, key: &K) {
        self.inner.lock().invalidate(key);
    }

    /// Removes every entry whose key satisfies the predicate. The predicate
    /// must not touch the cache.
    pub fn invalidate_fn<F>(&self, pred: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.inner.lock().invalidate_fn(pred);
    }

    /// Removes and returns the oldest entry, or `None` when empty.
    pub fn remove_oldest(&self) -> Option<(K, V)> {
        self.inner.lock().remove_oldest()
    }

    /// Returns the oldest entry without removing it or touching recency.
    pub fn get_oldest(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        self.inner
            .lock()
            .get_oldest()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    /// Keys from oldest to newest, expired entries included.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }

    /// Values from oldest to newest, expired entries included.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.lock().values()
    }

    /// Current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Changes the size cap, evicting oldest entries down to the new cap;
    /// returns how many were removed. `resize(0)` lifts the cap.
    pub fn resize(&self, max_keys: usize) -> usize {
        self.inner.lock().resize(max_keys)
    }

    /// Removes every expired entry.
    pub fn delete_expired(&self) {
        self.inner.lock().delete_expired();
    }

    /// Removes every entry, firing the eviction callback for each.
    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }

    /// Expiration instant of a present key, expired or not.
    pub fn get_expiration(&self, key: &K) -> Option<Instant> {
        self.inner.lock().get_expiration(key)
    }

    /// Configured eviction policy.
    pub fn policy(&self) -> EvictionPolicy {
        self.inner.lock().policy()
    }

    /// Configured size cap; 0 means unlimited.
    pub fn max_keys(&self) -> usize {
        self.inner.lock().max_keys()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("Cache")
            .field("len", &core.len())
            .field("max_keys", &core.max_keys())
            .field("policy", &core.policy())
            .finish_non_exhaustive()
    }
}

/// Renders the same `Size: {len}, Stats: {counters} ({hit_pct}%)` line as
/// the engine's `Display`, under the lock.
impl<K, V> fmt::Display for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.lock(), f)
    }
}

impl<K, V> BoundedCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn add(&self, key: K, value: V) -> bool {
        Cache::add(self, key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        Cache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn contains_or_add(&self, key: K, value: V) -> (bool, bool) {
        Cache::contains_or_add(self, key, value)
    }

    fn remove(&self, key: &K) -> bool {
        Cache::remove(self, key)
    }

    fn remove_oldest(&self) -> Option<(K, V)> {
        Cache::remove_oldest(self)
    }

    fn get_oldest(&self) -> Option<(K, V)> {
        Cache::get_oldest(self)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn keys(&self) -> Vec<K> {
        Cache::keys(self)
    }

    fn values(&self) -> Vec<V> {
        Cache::values(self)
    }

    fn purge(&self) {
        Cache::purge(self)
    }

    fn resize(&self, max_keys: usize) -> usize {
        Cache::resize(self, max_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn empty_engine_reports_absent_everywhere() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();

            assert_eq!(core.len(), 0);
            assert!(core.is_empty());
            assert!(core.get(&"k").is_none());
            assert!(core.peek(&"k").is_none());
            assert!(!core.contains(&"k"));
            assert!(!core.remove(&"k"));
            assert!(core.remove_oldest().is_none());
            assert!(core.get_oldest().is_none());
            assert!(core.keys().is_empty());
            assert!(core.values().is_empty());
        }

        #[test]
        fn set_then_get_roundtrip() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("k", 7, Duration::ZERO);

            assert_eq!(core.len(), 1);
            assert_eq!(core.get(&"k"), Some(&7));
            assert_eq!(core.peek(&"k"), Some(&7));
            assert!(core.contains(&"k"));
        }

        #[test]
        fn update_replaces_value_without_counting() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("k", 1, Duration::ZERO);
            core.set("k", 2, Duration::ZERO);

            assert_eq!(core.len(), 1);
            assert_eq!(core.get(&"k"), Some(&2));
            assert_eq!(core.stats().added, 1);
        }

        #[test]
        fn remove_drops_single_key() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);

            assert!(core.remove(&"a"));
            assert!(!core.remove(&"a"));
            assert_eq!(core.len(), 1);
            assert!(core.contains(&"b"));
        }

        #[test]
        fn invalidate_fn_applies_predicate() {
            let mut core: CacheCore<String, u32> = CacheCore::new();
            for i in 0..6 {
                core.set(format!("key{i}"), i, Duration::ZERO);
            }

            core.invalidate_fn(|key| key.ends_with('1') || key.ends_with('3'));

            assert_eq!(core.len(), 4);
            assert!(!core.contains(&"key1".to_string()));
            assert!(!core.contains(&"key3".to_string()));
            assert!(core.contains(&"key0".to_string()));
            core.check_invariants().unwrap();
        }

        #[test]
        fn contains_or_add_is_membership_gated() {
            let mut core: CacheCore<&str, u32> = CacheCore::new().with_max_keys(2);
            core.add("a", 1);
            core.add("b", 2);

            assert_eq!(core.contains_or_add("a", 99), (true, false));
            assert_eq!(core.get(&"a"), Some(&1));

            assert_eq!(core.contains_or_add("c", 3), (false, true));
            assert!(!core.contains(&"a"));
        }
    }

    mod recency {
        use super::*;

        #[test]
        fn lrc_orders_by_insertion() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);
            core.set("c", 3, Duration::ZERO);

            assert_eq!(core.keys(), vec!["a", "b", "c"]);
            assert_eq!(core.values(), vec![1, 2, 3]);
            assert_eq!(core.get_oldest(), Some((&"a", &1)));
        }

        #[test]
        fn lrc_read_does_not_reorder() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);

            core.get(&"a");
            assert_eq!(core.keys(), vec!["a", "b"]);
        }

        #[test]
        fn lru_read_promotes() {
            let mut core: CacheCore<&str, u32> = CacheCore::new().with_lru();
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);

            core.get(&"a");
            assert_eq!(core.keys(), vec!["b", "a"]);
        }

        #[test]
        fn write_promotes_under_both_policies() {
            for lru in [false, true] {
                let mut core: CacheCore<&str, u32> = CacheCore::new();
                if lru {
                    core = core.with_lru();
                }
                core.set("a", 1, Duration::ZERO);
                core.set("b", 2, Duration::ZERO);
                core.set("a", 10, Duration::ZERO);

                assert_eq!(core.keys(), vec!["b", "a"]);
            }
        }

        #[test]
        fn size_cap_evicts_from_the_back() {
            let mut core: CacheCore<&str, u32> = CacheCore::new().with_max_keys(2);
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);
            core.set("c", 3, Duration::ZERO);

            assert_eq!(core.len(), 2);
            assert_eq!(core.keys(), vec!["b", "c"]);
            assert_eq!(core.stats().evicted, 1);
            core.check_invariants().unwrap();
        }
    }

    mod expiry {
        use super::*;
        use std::thread::sleep;

        #[test]
        fn zero_ttl_means_default_not_immediate() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("k", 1, Duration::ZERO);

            let expires_at = core.get_expiration(&"k").unwrap();
            assert!(expires_at > Instant::now() + Duration::from_secs(365 * 24 * 60 * 60));
            assert_eq!(core.get(&"k"), Some(&1));
        }

        #[test]
        fn per_call_ttl_overrides_default() {
            let mut core: CacheCore<&str, u32> =
                CacheCore::new().with_ttl(Duration::from_millis(20));
            core.set("short", 1, Duration::ZERO);
            core.set("long", 2, Duration::from_secs(300));

            sleep(Duration::from_millis(40));

            assert!(core.get(&"short").is_none());
            assert_eq!(core.get(&"long"), Some(&2));
        }

        #[test]
        fn expired_entry_is_a_miss_but_stays_cached() {
            let mut core: CacheCore<&str, u32> =
                CacheCore::new().with_ttl(Duration::from_millis(20));
            core.set("k", 1, Duration::ZERO);

            sleep(Duration::from_millis(40));

            assert!(core.get(&"k").is_none());
            assert!(core.peek(&"k").is_none());
            assert_eq!(core.len(), 1);
            assert_eq!(core.keys(), vec!["k"]);
            assert_eq!(core.stats().misses, 1);
        }

        #[test]
        fn write_trims_one_expired_back_node() {
            let mut core: CacheCore<&str, u32> =
                CacheCore::new().with_ttl(Duration::from_millis(20));
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);

            sleep(Duration::from_millis(40));

            // Both expired; one write reclaims exactly one back node.
            core.set("c", 3, Duration::ZERO);
            assert_eq!(core.len(), 2);
            assert!(!core.contains(&"a"));
            assert!(core.contains(&"b"));
            core.check_invariants().unwrap();
        }

        #[test]
        fn get_expiration_tracks_per_call_ttl() {
            let mut core: CacheCore<&str, u32> =
                CacheCore::new().with_ttl(Duration::from_secs(5));
            let before = Instant::now();
            core.set("k", 1, Duration::from_secs(10));

            let expires_at = core.get_expiration(&"k").unwrap();
            assert!(expires_at >= before + Duration::from_secs(9));
            assert!(expires_at <= Instant::now() + Duration::from_secs(11));
            assert!(core.get_expiration(&"missing").is_none());
        }
    }

    mod accounting {
        use super::*;
        use parking_lot::Mutex;

        #[test]
        fn counter_ledger_matches_len() {
            let mut core: CacheCore<String, u32> = CacheCore::new().with_max_keys(4);
            for i in 0..10 {
                core.set(format!("key{i}"), i, Duration::ZERO);
            }
            core.remove(&"key9".to_string());
            core.remove_oldest();

            let stats = core.stats();
            assert_eq!(stats.added - stats.evicted, core.len() as u64);
            core.check_invariants().unwrap();
        }

        #[test]
        fn purge_counts_each_entry_and_is_idempotent() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("a", 1, Duration::ZERO);
            core.set("b", 2, Duration::ZERO);

            core.purge();
            assert!(core.is_empty());
            assert_eq!(core.stats().evicted, 2);

            core.purge();
            assert!(core.is_empty());
            assert_eq!(core.stats().evicted, 2);
            core.check_invariants().unwrap();
        }

        #[test]
        fn callback_fires_on_every_removal_path() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&log);
            let mut core: CacheCore<String, u32> = CacheCore::new()
                .with_max_keys(2)
                .with_on_evicted(move |key: &String, value| sink.lock().push((key.clone(), *value)));

            core.set("a".into(), 1, Duration::ZERO);
            core.set("b".into(), 2, Duration::ZERO);
            core.set("c".into(), 3, Duration::ZERO); // size cap evicts "a"
            core.remove(&"b".to_string());
            core.purge(); // drops "c"

            let log = log.lock();
            assert_eq!(
                *log,
                vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)]
            );
        }

        #[test]
        fn engine_renders_the_same_line_as_the_handle() {
            let mut core: CacheCore<&str, u32> = CacheCore::new();
            core.set("k", 1, Duration::ZERO);
            core.get(&"k");
            core.get(&"missing");

            assert_eq!(
                core.to_string(),
                "Size: 1, Stats: {Hits:1 Misses:1 Added:1 Evicted:0} (50.0%)"
            );
        }

        #[test]
        fn dropping_the_engine_is_not_an_eviction() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&log);
            {
                let mut core: CacheCore<String, u32> =
                    CacheCore::new().with_on_evicted(move |key: &String, _| sink.lock().push(key.clone()));
                core.set("a".into(), 1, Duration::ZERO);
                core.set("b".into(), 2, Duration::ZERO);
            }
            assert!(log.lock().is_empty());
        }
    }

    mod handle {
        use super::*;

        #[test]
        fn clones_share_one_engine() {
            let cache: Cache<&str, u32> = Cache::new();
            let other = cache.clone();

            cache.set("k", 1, Duration::ZERO);
            assert_eq!(other.get(&"k"), Some(1));
            assert_eq!(other.len(), 1);
        }

        #[test]
        fn default_is_unbounded_lrc() {
            let cache: Cache<&str, u32> = Cache::default();
            assert_eq!(cache.max_keys(), 0);
            assert_eq!(cache.policy(), EvictionPolicy::Lrc);
        }

        #[test]
        fn display_before_any_lookup_shows_nan() {
            let cache: Cache<&str, u32> = Cache::new();
            assert_eq!(
                cache.to_string(),
                "Size: 0, Stats: {Hits:0 Misses:0 Added:0 Evicted:0} (NaN%)"
            );
        }

        #[test]
        fn debug_does_not_traverse_entries() {
            let cache: Cache<&str, u32> = Cache::new().with_max_keys(3);
            cache.set("k", 1, Duration::ZERO);
            let rendered = format!("{cache:?}");
            assert!(rendered.contains("len: 1"));
            assert!(rendered.contains("max_keys: 3"));
        }
    }
}
