//! Entry API for `CbgMap`.

use std::hash::{BuildHasher, Hash};

use crate::layout::BinLayout;
use crate::map::CbgMap;

/// A view into a single entry in a `CbgMap`, which may either be vacant or
/// occupied.
pub enum Entry<'a, const B: usize, K, V, L, S> {
    Occupied(OccupiedEntry<'a, B, K, V, L, S>),
    Vacant(VacantEntry<'a, B, K, V, L, S>),
}

/// A view into an occupied entry in a `CbgMap`.
pub struct OccupiedEntry<'a, const B: usize, K, V, L, S> {
    map: &'a mut CbgMap<B, K, V, L, S>,
    key: K,
}

/// A view into a vacant entry in a `CbgMap`.
pub struct VacantEntry<'a, const B: usize, K, V, L, S> {
    map: &'a mut CbgMap<B, K, V, L, S>,
    key: K,
}

impl<'a, const B: usize, K, V, L, S> Entry<'a, B, K, V, L, S>
where
    K: Eq + Hash + Clone,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => &entry.key,
            Entry::Vacant(entry) => &entry.key,
        }
    }

    /// Ensures a value is in the entry by inserting the default if empty,
    /// and returns a mutable reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the
    /// default function if empty, and returns a mutable reference to the
    /// value in the entry.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    pub fn and_modify<F: FnOnce(&mut V)>(mut self, f: F) -> Self {
        if let Entry::Occupied(entry) = &mut self {
            f(entry.get_mut());
        }
        self
    }
}

impl<'a, const B: usize, K, V, L, S> Entry<'a, B, K, V, L, S>
where
    K: Eq + Hash + Clone,
    V: Default,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    /// Ensures a value is in the entry by inserting the default value if
    /// empty, and returns a mutable reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

impl<'a, const B: usize, K, V, L, S> OccupiedEntry<'a, B, K, V, L, S>
where
    K: Eq + Hash,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a mut CbgMap<B, K, V, L, S>, key: K) -> Self {
        Self { map, key }
    }

    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.map.get(&self.key).expect("OccupiedEntry: key not found")
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.map
            .get_mut(&self.key)
            .expect("OccupiedEntry: key not found")
    }

    /// Converts the entry into a mutable reference to its value.
    pub fn into_mut(self) -> &'a mut V {
        self.map
            .get_mut(&self.key)
            .expect("OccupiedEntry: key not found")
    }

    /// Sets the value of the entry, and returns the entry's old value.
    pub fn insert(&mut self, value: V) -> V {
        std::mem::replace(self.get_mut(), value)
    }

    /// Takes the value out of the entry, and returns it.
    pub fn remove(self) -> V {
        self.map
            .remove(&self.key)
            .expect("OccupiedEntry: key not found")
    }
}

impl<'a, const B: usize, K, V, L, S> VacantEntry<'a, B, K, V, L, S>
where
    K: Eq + Hash + Clone,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a mut CbgMap<B, K, V, L, S>, key: K) -> Self {
        Self { map, key }
    }

    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Sets the value of the entry, and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let key = self.key.clone();
        self.map.insert(self.key, value);
        self.map
            .get_mut(&key)
            .expect("VacantEntry::insert: failed to find inserted entry")
    }
}
