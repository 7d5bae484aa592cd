//! Cuckoo hash containers over anchored sliding windows.
//!
//! Instead of disjoint blocked buckets, every bin position anchors an
//! overlapping window of `B` consecutive bins, forward or reversed. Each key
//! hashes once; the hash and its 32-bit rotation pick two candidate windows.
//! Insertion follows a label discipline: the bin with the minimum label is
//! displaced and relabelled `min(other_window_min + 1, L_MAX)`, which keeps
//! eviction chains short, and window reversal plus hopscotch moves find
//! empty bins without evicting at all. Per-bin metadata (one or two bytes)
//! lets most lookups, negative ones included, touch a single memory region.
//!
//! Picking a configuration:
//!
//! - `B = 2`: fastest, keep load below ~80%
//! - `B = 3`: balanced, load up to ~95%
//! - `B = 4`: densest, load above 95%
//!
//! The containers are single-threaded. Concurrent readers are fine once
//! construction has been published (lookups read each bin's metadata word
//! once and never write), but any mutation needs exclusive access, and
//! operations that can grow the table (`insert`, `reserve`) invalidate
//! every outstanding position or reference.
//!
//! ```
//! use cbgtable::MapSoA;
//!
//! let mut ranks = MapSoA::<3, String, u32>::new();
//! ranks.insert("pawn".to_string(), 1);
//! ranks.insert("queen".to_string(), 9);
//! assert_eq!(ranks.get("queen"), Some(&9));
//! assert!(!ranks.contains_key("king"));
//! ```

pub mod entry;
pub mod hash;
pub mod layout;
pub mod map;
pub mod meta;
pub mod set;
pub mod table;
pub mod window;

#[cfg(test)]
mod proptests;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use layout::{AobLayout, AosLayout, BinLayout, SoaLayout};
pub use map::CbgMap;
pub use set::CbgSet;
pub use table::SearchHint;

/// Errors surfaced to callers. Everything else is either handled internally
/// (a full table grows) or is a debug-time invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The key is not present (`CbgMap::at`).
    #[error("key not present in the map")]
    KeyNotFound,
}

/// Set with metadata in its own array plus a short-hash prefilter; the
/// fastest for negative queries.
pub type SetSoA<const B: usize, T, S = ahash::RandomState> = CbgSet<B, T, SoaLayout<T, ()>, S>;

/// Set with one packed record per bin; the fastest for positive queries.
pub type SetAoS<const B: usize, T, S = ahash::RandomState> = CbgSet<B, T, AosLayout<T, ()>, S>;

/// Set with records grouped in aligned blocks; positive-query oriented
/// without unaligned access.
pub type SetAoB<const B: usize, T, S = ahash::RandomState> = CbgSet<B, T, AobLayout<T, ()>, S>;

/// Map counterpart of [`SetSoA`].
pub type MapSoA<const B: usize, K, V, S = ahash::RandomState> = CbgMap<B, K, V, SoaLayout<K, V>, S>;

/// Map counterpart of [`SetAoS`].
pub type MapAoS<const B: usize, K, V, S = ahash::RandomState> = CbgMap<B, K, V, AosLayout<K, V>, S>;

/// Map counterpart of [`SetAoB`].
pub type MapAoB<const B: usize, K, V, S = ahash::RandomState> = CbgMap<B, K, V, AobLayout<K, V>, S>;
