//! CuckooHashMap: key/value container with entries embedded in table slots.

use crate::raw_table::{self, RawCuckoo, DEFAULT_CAPACITY, DEFAULT_TABLES};
use crate::slot::{InlineSlot, Pair, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

type MapSlot<K, V> = InlineSlot<Pair<K, V>>;

/// A map from K to V over d-ary cuckoo hashing. Each key owns one
/// candidate slot per sub-table; lookups probe at most
/// [`tables_count`](Self::tables_count) slots.
pub struct CuckooHashMap<K, V, S = RandomState> {
    raw: RawCuckoo<K, V, MapSlot<K, V>, S>,
}

impl<K, V> CuckooHashMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map with the default shape (64 slots in each of 2
    /// sub-tables).
    pub fn new() -> Self {
        Self::with_capacity_and_tables(DEFAULT_CAPACITY, DEFAULT_TABLES)
    }

    /// An empty map with `capacity` slots in each of `tables` sub-tables.
    ///
    /// Panics if `capacity` is zero or `tables` is less than two.
    pub fn with_capacity_and_tables(capacity: usize, tables: usize) -> Self {
        Self::with_capacity_and_tables_and_hasher(capacity, tables, RandomState::new())
    }
}

impl<K, V> Default for CuckooHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CuckooHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_tables_and_hasher(DEFAULT_CAPACITY, DEFAULT_TABLES, hasher)
    }

    pub fn with_capacity_and_tables_and_hasher(capacity: usize, tables: usize, hasher: S) -> Self {
        Self {
            raw: RawCuckoo::with_shape_and_hasher(capacity, tables, hasher),
        }
    }

    /// Insert a new entry. Returns true on a fresh insertion; false means
    /// the key was already present and nothing changed.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(Pair { key, value })
    }

    /// [`insert`](Self::insert) taking an already-formed pair.
    pub fn insert_pair(&mut self, pair: Pair<K, V>) -> bool {
        self.raw.insert(pair)
    }

    /// Insert, or overwrite the stored value when the key is present.
    /// Returns true on a fresh insertion, false on an overwrite.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> bool {
        self.raw.insert_or_assign(Pair { key, value })
    }

    /// Read-only view of the value for a key.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find(key).map(|entry| &entry.value)
    }

    /// Mutable view of the value for a key; needs the map uniquely held.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find_mut(key).map(|entry| &mut entry.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(key)
    }

    /// Number of entries stored under the key: 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(key) as usize
    }

    /// Remove the entry for the key. Returns whether one was removed.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.erase(key)
    }

    /// Remove the entry for the key and hand it to the caller.
    pub fn extract<Q>(&mut self, key: &Q) -> Option<Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.extract(key)
    }

    /// Remove every entry matching the predicate; returns how many.
    pub fn erase_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.raw.erase_if(|entry| pred(&entry.key, &entry.value))
    }

    /// Count entries matching the predicate.
    pub fn count_if<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.raw.count_if(|entry| pred(&entry.key, &entry.value))
    }

    /// Insert a sequence of entries; one outcome per input, in input
    /// order. Later inputs observe the effects of earlier ones.
    pub fn insert_many<I>(&mut self, entries: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .map(|(key, value)| self.insert(key, value))
            .collect()
    }

    /// Insert-or-assign a sequence of entries; one outcome per input, in
    /// input order.
    pub fn insert_or_assign_many<I>(&mut self, entries: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .map(|(key, value)| self.insert_or_assign(key, value))
            .collect()
    }

    /// Erase a sequence of keys; one outcome per input, in input order.
    pub fn erase_many<'q, Q, I>(&mut self, keys: I) -> Vec<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().map(|key| self.erase(key)).collect()
    }

    /// Extract a sequence of keys; one outcome per input, in input order.
    pub fn extract_many<'q, Q, I>(&mut self, keys: I) -> Vec<Option<Pair<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().map(|key| self.extract(key)).collect()
    }

    /// Empty the map; shape is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Exchange the entire contents and shape with another map.
    pub fn swap(&mut self, other: &mut Self) {
        self.raw.swap(&mut other.raw);
    }

    /// Occupied slots over total slots, in [0, 1].
    pub fn load_factor(&self) -> f64 {
        self.raw.load_factor()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn tables_count(&self) -> usize {
        self.raw.tables_count()
    }

    /// Slots per sub-table.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn total_capacity(&self) -> usize {
        self.raw.total_capacity()
    }

    /// Reshape to `new_capacity` slots per sub-table and re-place every
    /// entry; 0 asks for the built-in growth factor. Reinsertion may
    /// trigger further growth, so the resulting capacity is at least
    /// `new_capacity`.
    pub fn resize(&mut self, new_capacity: usize) {
        self.raw.resize(new_capacity);
    }

    /// Raise the sub-table count, re-placing every entry. Counts of two
    /// or less are rejected (returns false, no state change).
    pub fn restrain(&mut self, new_tables: usize) -> bool {
        self.raw.restrain(new_tables)
    }

    /// Walk live entries. Order is unspecified and changes across
    /// structural mutations.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.raw.entries(),
        }
    }

    /// Walk live entries with mutable value access.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.entries_mut(),
        }
    }

    /// Read-only walk of the raw grid: one inner iterator per sub-table,
    /// yielding each slot's occupancy. Diagnostic affordance, not a
    /// stable iteration contract.
    pub fn tables(&self) -> Tables<'_, K, V> {
        Tables {
            rows: self.raw.rows().iter(),
        }
    }
}

impl<K, V, S> fmt::Debug for CuckooHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` for live entries.
pub struct Iter<'a, K, V> {
    inner: raw_table::Entries<'a, K, V, MapSlot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }
}

/// Iterator over `(&K, &mut V)` for live entries.
pub struct IterMut<'a, K, V> {
    inner: raw_table::EntriesMut<'a, K, V, MapSlot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (&entry.key, &mut entry.value))
    }
}

/// Iterator over sub-tables; each item walks that sub-table's slots.
pub struct Tables<'a, K, V> {
    rows: core::slice::Iter<'a, Vec<MapSlot<K, V>>>,
}

impl<'a, K, V> Iterator for Tables<'a, K, V> {
    type Item = TableSlots<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| TableSlots { slots: row.iter() })
    }
}

/// Iterator over one sub-table's slots: `None` for an empty slot,
/// `Some((&K, &V))` for an occupied one.
pub struct TableSlots<'a, K, V> {
    slots: core::slice::Iter<'a, MapSlot<K, V>>,
}

impl<'a, K, V> Iterator for TableSlots<'a, K, V> {
    type Item = Option<(&'a K, &'a V)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .next()
            .map(|slot| slot.get().map(|entry| (&entry.key, &entry.value)))
    }
}
