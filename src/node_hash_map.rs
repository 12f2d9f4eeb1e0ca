//! CuckooNodeHashMap: key/value container with each entry in its own
//! heap cell.
//!
//! Slot cost is one pointer when empty, so large entries do not inflate
//! the grid; displacement swaps through existing cells and never
//! allocates. The trade against [`CuckooHashMap`](crate::CuckooHashMap)
//! is a pointer chase per slot inspection.

use crate::raw_table::{self, RawCuckoo, DEFAULT_CAPACITY, DEFAULT_TABLES};
use crate::slot::{NodeSlot, Pair, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

type MapSlot<K, V> = NodeSlot<Pair<K, V>>;

pub struct CuckooNodeHashMap<K, V, S = RandomState> {
    raw: RawCuckoo<K, V, MapSlot<K, V>, S>,
}

impl<K, V> CuckooNodeHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity_and_tables(DEFAULT_CAPACITY, DEFAULT_TABLES)
    }

    /// Panics if `capacity` is zero or `tables` is less than two.
    pub fn with_capacity_and_tables(capacity: usize, tables: usize) -> Self {
        Self::with_capacity_and_tables_and_hasher(capacity, tables, RandomState::new())
    }
}

impl<K, V> Default for CuckooNodeHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CuckooNodeHashMap<K, V, S>
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

    /// True on a fresh insertion; false means the key was already present
    /// and nothing changed.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(Pair { key, value })
    }

    pub fn insert_pair(&mut self, pair: Pair<K, V>) -> bool {
        self.raw.insert(pair)
    }

    /// True on a fresh insertion, false on an overwrite of an existing
    /// value.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> bool {
        self.raw.insert_or_assign(Pair { key, value })
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find(key).map(|entry| &entry.value)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find_mut(key).map(|entry| &mut entry.value)
    }

    /// Read-only view of the whole stored entry. The borrow ends at the
    /// next mutating call on this map.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find(key).map(|entry| (&entry.key, &entry.value))
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(key)
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(key) as usize
    }

    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.erase(key)
    }

    /// Remove the entry for the key; the heap cell is released and its
    /// contents handed to the caller.
    pub fn extract<Q>(&mut self, key: &Q) -> Option<Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.extract(key)
    }

    pub fn erase_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.raw.erase_if(|entry| pred(&entry.key, &entry.value))
    }

    pub fn count_if<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.raw.count_if(|entry| pred(&entry.key, &entry.value))
    }

    /// One outcome per input, in input order.
    pub fn insert_many<I>(&mut self, entries: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .map(|(key, value)| self.insert(key, value))
            .collect()
    }

    /// One outcome per input, in input order.
    pub fn insert_or_assign_many<I>(&mut self, entries: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .map(|(key, value)| self.insert_or_assign(key, value))
            .collect()
    }

    /// One outcome per input, in input order.
    pub fn erase_many<'q, Q, I>(&mut self, keys: I) -> Vec<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().map(|key| self.erase(key)).collect()
    }

    /// One outcome per input, in input order.
    pub fn extract_many<'q, Q, I>(&mut self, keys: I) -> Vec<Option<Pair<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().map(|key| self.extract(key)).collect()
    }

    /// Empty the map, releasing every heap cell; shape is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.raw.swap(&mut other.raw);
    }

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

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn total_capacity(&self) -> usize {
        self.raw.total_capacity()
    }

    /// See [`CuckooHashMap::resize`](crate::CuckooHashMap::resize).
    pub fn resize(&mut self, new_capacity: usize) {
        self.raw.resize(new_capacity);
    }

    /// See [`CuckooHashMap::restrain`](crate::CuckooHashMap::restrain).
    pub fn restrain(&mut self, new_tables: usize) -> bool {
        self.raw.restrain(new_tables)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.raw.entries(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.entries_mut(),
        }
    }

    /// Read-only walk of the raw grid, one inner iterator per sub-table.
    pub fn tables(&self) -> Tables<'_, K, V> {
        Tables {
            rows: self.raw.rows().iter(),
        }
    }
}

impl<K, V, S> fmt::Debug for CuckooNodeHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

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

pub struct Tables<'a, K, V> {
    rows: core::slice::Iter<'a, Vec<MapSlot<K, V>>>,
}

impl<'a, K, V> Iterator for Tables<'a, K, V> {
    type Item = TableSlots<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| TableSlots { slots: row.iter() })
    }
}

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
