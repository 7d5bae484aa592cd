//! Set façade over the core table.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;

use crate::layout::{BinLayout, SoaLayout};
use crate::table::{CoreTable, SearchHint};

/// A cuckoo-hashed set over anchored sliding windows of width `B`.
///
/// `B = 2` is the fastest at moderate load, `B = 4` wastes the least memory
/// at very high load, `B = 3` sits in between. The default layout keeps
/// metadata in its own array with a short-hash prefilter (fastest negative
/// lookups); see [`crate::SetAoS`] and [`crate::SetAoB`] for the packed
/// variants.
pub struct CbgSet<const B: usize, T, L = SoaLayout<T, ()>, S = RandomState> {
    core: CoreTable<B, T, (), L, S>,
}

impl<const B: usize, T, L> CbgSet<B, T, L, RandomState>
where
    L: BinLayout<T, ()>,
{
    /// Create an empty set.
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Create a set with room for `capacity` bins up front.
    ///
    /// The actual capacity is at least `2 * B - 2`.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<const B: usize, T, L, S> CbgSet<B, T, L, S>
where
    L: BinLayout<T, ()>,
{
    /// Create an empty set with the provided hasher.
    #[inline]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            core: CoreTable::with_hasher(hasher),
        }
    }

    /// Create a pre-sized set with the provided hasher.
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            core: CoreTable::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Number of elements in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns `true` if the set contains no elements.
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

    /// Removes all elements, keeping the allocated bins.
    pub fn clear(&mut self) {
        self.core.clear();
    }
}

impl<const B: usize, T, L, S> CbgSet<B, T, L, S>
where
    T: Hash + Eq,
    L: BinLayout<T, ()>,
    S: BuildHasher,
{
    /// Adds a value to the set.
    ///
    /// Returns `true` if it was not already present; inserting a present
    /// value leaves the set unchanged. May grow the table.
    pub fn insert(&mut self, value: T) -> bool {
        if self.core.find(&value, SearchHint::ExpectNegative).is_some() {
            return false;
        }
        self.core.insert_entry(value, ());
        true
    }

    /// Returns `true` if the set contains `value`.
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(value, SearchHint::Unknown).is_some()
    }

    /// `contains` with a caller-supplied expectation that picks the probe
    /// order (skip or force the secondary-window probe).
    #[inline]
    pub fn contains_with_hint<Q>(&self, value: &Q, hint: SearchHint) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(value, hint).is_some()
    }

    /// Number of matching elements: 0 or 1.
    #[inline]
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.contains(value))
    }

    /// Removes a value from the set; returns `true` if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.core.find(value, SearchHint::Unknown) {
            Some(pos) => {
                self.core.take_at(pos);
                true
            }
            None => false,
        }
    }

    /// Grows the table to at least `capacity` bins. References into the set
    /// are invalidated. No-op unless the request leaves growth headroom.
    pub fn reserve(&mut self, capacity: usize) {
        self.core.reserve(capacity);
    }
}

impl<const B: usize, T, L> Default for CbgSet<B, T, L, RandomState>
where
    L: BinLayout<T, ()>,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{AobLayout, AosLayout};
    use rand::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_new() {
        let set: CbgSet<3, u64> = CbgSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 0);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set: CbgSet<3, u64> = CbgSet::new();

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert_eq!(set.len(), 2);

        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
        assert_eq!(set.count(&1), 1);
        assert_eq!(set.count(&3), 0);
    }

    #[test]
    fn test_insert_dedupes() {
        let mut set: CbgSet<2, u64> = CbgSet::new();

        assert!(set.insert(42));
        assert!(!set.insert(42));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut set: CbgSet<3, u64> = CbgSet::new();

        set.insert(7);
        assert!(set.remove(&7));
        assert!(!set.remove(&7));
        assert!(set.is_empty());
        assert!(!set.contains(&7));
    }

    #[test]
    fn test_string_values_with_borrow() {
        let mut set: CbgSet<3, String> = CbgSet::new();

        set.insert("hello".to_string());
        set.insert("world".to_string());

        // Look up with &str instead of &String
        assert!(set.contains("hello"));
        assert!(set.contains("world"));
        assert!(!set.contains("foo"));
        assert!(set.remove("hello"));
        assert!(!set.contains("hello"));
    }

    #[test]
    fn test_clear() {
        let mut set: CbgSet<3, u64> = CbgSet::with_capacity(64);

        for i in 0..40 {
            set.insert(i);
        }
        assert_eq!(set.len(), 40);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&10));

        for i in 0..40 {
            assert!(set.insert(i));
        }
        assert_eq!(set.len(), 40);
    }

    #[test]
    fn test_many_inserts_with_growth() {
        let mut set: CbgSet<3, u64> = CbgSet::new();

        for i in 0u64..10_000 {
            set.insert(i);
        }
        assert_eq!(set.len(), 10_000);

        for i in 0u64..10_000 {
            assert!(set.contains(&i), "Missing value {}", i);
        }
        for i in 10_000u64..11_000 {
            assert!(!set.contains(&i));
        }
    }

    #[test]
    fn test_random_round_trip_against_model() {
        // Inserted keys answer positively, a disjoint random draw negatively.
        let mut set: CbgSet<4, u64> = CbgSet::with_capacity(2_000);
        let mut model = HashSet::new();
        let mut rng = StdRng::seed_from_u64(21);

        while model.len() < 1_000 {
            let key: u64 = rng.gen();
            set.insert(key);
            model.insert(key);
        }
        assert_eq!(set.len(), model.len());

        for key in &model {
            assert!(set.contains(key));
        }
        let mut misses = 0;
        while misses < 1_000 {
            let probe: u64 = rng.gen();
            if model.contains(&probe) {
                continue;
            }
            misses += 1;
            assert!(!set.contains(&probe));
        }
    }

    #[test]
    fn test_hints() {
        let mut set: CbgSet<2, u64> = CbgSet::with_capacity(128);
        for i in 0..80 {
            set.insert(i);
        }
        for i in 0..80 {
            assert!(set.contains_with_hint(&i, SearchHint::ExpectPositive));
            assert!(set.contains_with_hint(&i, SearchHint::ExpectNegative));
        }
        for i in 1_000..1_080 {
            assert!(!set.contains_with_hint(&i, SearchHint::ExpectNegative));
            assert!(!set.contains_with_hint(&i, SearchHint::ExpectPositive));
        }
    }

    #[test]
    fn test_reserve_keeps_membership() {
        let mut set: CbgSet<3, u64> = CbgSet::with_capacity(16);
        for i in 0..12 {
            set.insert(i);
        }
        set.reserve(512);
        assert!(set.capacity() >= 512);
        assert_eq!(set.len(), 12);
        for i in 0..12 {
            assert!(set.contains(&i));
        }
    }

    #[test]
    fn test_other_layouts() {
        let mut aos: CbgSet<3, u64, AosLayout<u64, ()>> = CbgSet::new();
        let mut aob: CbgSet<3, u64, AobLayout<u64, ()>> = CbgSet::new();
        for i in 0..500u64 {
            assert!(aos.insert(i));
            assert!(aob.insert(i));
        }
        for i in 0..500u64 {
            assert!(aos.contains(&i));
            assert!(aob.contains(&i));
            assert!(!aos.contains(&(i + 500)));
            assert!(!aob.contains(&(i + 500)));
        }
    }

    #[test]
    fn test_load_factor_accounting() {
        let mut set: CbgSet<4, u64> = CbgSet::with_capacity(100);
        assert_eq!(set.load_factor(), 0.0);
        for i in 0..50 {
            set.insert(i);
        }
        assert!((set.load_factor() - 0.5).abs() < 1e-6);
        assert!((set.max_load_factor() - 0.9).abs() < 1e-6);
        assert!((set.grow_factor() - 1.2).abs() < 1e-6);
    }
}
