//! Map façade over the core table.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;

use crate::entry::{Entry, OccupiedEntry, VacantEntry};
use crate::layout::{BinLayout, SoaLayout};
use crate::table::{CoreTable, SearchHint};
use crate::Error;

/// A cuckoo-hashed map over anchored sliding windows of width `B`.
///
/// Same engine and layout choices as [`crate::CbgSet`], with a value stored
/// next to each key. Inserting an existing key overwrites its value.
pub struct CbgMap<const B: usize, K, V, L = SoaLayout<K, V>, S = RandomState> {
    core: CoreTable<B, K, V, L, S>,
}

impl<const B: usize, K, V, L> CbgMap<B, K, V, L, RandomState>
where
    L: BinLayout<K, V>,
{
    /// Create an empty map.
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Create a map with room for `capacity` bins up front.
    ///
    /// The actual capacity is at least `2 * B - 2`.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<const B: usize, K, V, L, S> CbgMap<B, K, V, L, S>
where
    L: BinLayout<K, V>,
{
    /// Create an empty map with the provided hasher.
    #[inline]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            core: CoreTable::with_hasher(hasher),
        }
    }

    /// Create a pre-sized map with the provided hasher.
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            core: CoreTable::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Number of bins.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Same as `capacity()`.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.core.capacity()
    }

    /// Current fill, `len / capacity`, in `[0, 1]`.
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.core.load_factor()
    }

    /// Fill level that triggers growth on insert. Defaults to 0.9.
    #[inline]
    pub fn max_load_factor(&self) -> f32 {
        self.core.max_load_factor()
    }

    /// Sets the growth-trigger fill level. Must be in `(0, 1)`.
    pub fn set_max_load_factor(&mut self, factor: f32) {
        self.core.set_max_load_factor(factor);
    }

    /// Capacity multiplier used when the table grows. Defaults to 1.2.
    #[inline]
    pub fn grow_factor(&self) -> f32 {
        self.core.grow_factor()
    }

    /// Sets the growth multiplier. Must be above 1.
    pub fn set_grow_factor(&mut self, factor: f32) {
        self.core.set_grow_factor(factor);
    }

    /// Returns a reference to the hasher.
    #[inline]
    pub fn hasher(&self) -> &S {
        self.core.hasher()
    }

    /// Removes all entries, keeping the allocated bins.
    pub fn clear(&mut self) {
        self.core.clear();
    }
}

impl<const B: usize, K, V, L, S> CbgMap<B, K, V, L, S>
where
    K: Hash + Eq,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is replaced and the old
    /// value returned. May grow the table.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(pos) = self.core.find(&key, SearchHint::Unknown) {
            return Some(std::mem::replace(self.core.value_at_mut(pos), value));
        }
        self.core.insert_entry(key, value);
        None
    }

    /// Returns a reference to the value associated with the given key.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with_hint(key, SearchHint::Unknown)
    }

    /// `get` with a caller-supplied expectation that picks the probe order.
    #[inline]
    pub fn get_with_hint<Q>(&self, key: &Q, hint: SearchHint) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(key, hint).map(|pos| self.core.value_at(pos))
    }

    /// Returns a mutable reference to the value associated with the key.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.core.find(key, SearchHint::Unknown) {
            Some(pos) => Some(self.core.value_at_mut(pos)),
            None => None,
        }
    }

    /// Returns the value for `key` or [`Error::KeyNotFound`].
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with_hint(key, SearchHint::ExpectPositive)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the map contains the given key.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(key, SearchHint::Unknown).is_some()
    }

    /// `contains_key` with a caller-supplied probe-order expectation.
    #[inline]
    pub fn contains_key_with_hint<Q>(&self, key: &Q, hint: SearchHint) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(key, hint).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.core.find(key, SearchHint::Unknown)?;
        Some(self.core.take_at(pos).1)
    }

    /// Grows the table to at least `capacity` bins. References into the map
    /// are invalidated. No-op unless the request leaves growth headroom.
    pub fn reserve(&mut self, capacity: usize) {
        self.core.reserve(capacity);
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    pub fn entry(&mut self, key: K) -> Entry<'_, B, K, V, L, S>
    where
        K: Clone,
    {
        if self.contains_key(&key) {
            Entry::Occupied(OccupiedEntry::new(self, key))
        } else {
            Entry::Vacant(VacantEntry::new(self, key))
        }
    }
}

impl<const B: usize, K, V, L> Default for CbgMap<B, K, V, L, RandomState>
where
    L: BinLayout<K, V>,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
