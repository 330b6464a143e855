//! Error types.
//!
//! The cache has no recoverable error kinds on its operation path: missing
//! keys come back as `None`/`false`, removals of absent keys are no-ops, and
//! empty-cache queries return absent flags. The only error type in the crate
//! is [`InvariantError`], produced by the debug-oriented
//! [`CacheCore::check_invariants`](crate::cache::CacheCore::check_invariants)
//! used by the test suite. Each variant names the index/recency-list coupling
//! rule that was found broken.

use std::fmt;

/// A broken coupling between the index, the recency list and the counters.
///
/// This is a diagnostic type: a correctly functioning cache never produces
/// it. Variants carry the observed sizes so a failing test log shows how far
/// apart the structures drifted.
///
/// # Example
///
/// ```
/// use expirable::error::InvariantError;
///
/// let err = InvariantError::LengthMismatch { index_len: 2, list_len: 3 };
/// assert_eq!(
///     err.to_string(),
///     "index holds 2 entries but the recency list holds 3",
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// Exactly one end of the recency list is attached.
    DetachedEnd,
    /// An index slot references a node other than the one carrying its key.
    MisdirectedSlot,
    /// A recency-list node's key has no index slot.
    UnindexedKey,
    /// Following `next` links visited more nodes than the index holds.
    ListCycle {
        /// Entry count the index reported when the walk overran it.
        index_len: usize,
    },
    /// The index and the recency list disagree on the entry count.
    LengthMismatch {
        /// Entries in the index.
        index_len: usize,
        /// Nodes reached by walking the list.
        list_len: usize,
    },
    /// The lifetime counters do not balance against the current size.
    UnbalancedLedger {
        /// Entries created over the cache's lifetime.
        added: u64,
        /// Entries destroyed over the cache's lifetime.
        evicted: u64,
        /// Current entry count.
        len: usize,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InvariantError::DetachedEnd => {
                f.write_str("recency list has exactly one end attached")
            }
            InvariantError::MisdirectedSlot => {
                f.write_str("index slot does not reference the node holding its key")
            }
            InvariantError::UnindexedKey => {
                f.write_str("recency-list node's key is missing from the index")
            }
            InvariantError::ListCycle { index_len } => {
                write!(f, "recency list cycles: walked past all {index_len} indexed entries")
            }
            InvariantError::LengthMismatch { index_len, list_len } => {
                write!(f, "index holds {index_len} entries but the recency list holds {list_len}")
            }
            InvariantError::UnbalancedLedger { added, evicted, len } => {
                write!(
                    f,
                    "counter ledger out of balance: added {added} - evicted {evicted} != len {len}"
                )
            }
        }
    }
}

impl std::error::Error for InvariantError {}
