//! CuckooHashSet: set of values with entries embedded in table slots.
//!
//! A set entry is its own key: hashing and equality run on the stored
//! value, and lookups hand out read-only views only, since mutating a
//! stored value would silently re-key it.

use crate::raw_table::{self, RawCuckoo, DEFAULT_CAPACITY, DEFAULT_TABLES};
use crate::slot::{InlineSlot, Pair, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

type SetSlot<V> = InlineSlot<Pair<V, ()>>;

pub struct CuckooHashSet<V, S = RandomState> {
    raw: RawCuckoo<V, (), SetSlot<V>, S>,
}

impl<V> CuckooHashSet<V>
where
    V: Eq + Hash,
{
    /// An empty set with the default shape (64 slots in each of 2
    /// sub-tables).
    pub fn new() -> Self {
        Self::with_capacity_and_tables(DEFAULT_CAPACITY, DEFAULT_TABLES)
    }

    /// Panics if `capacity` is zero or `tables` is less than two.
    pub fn with_capacity_and_tables(capacity: usize, tables: usize) -> Self {
        Self::with_capacity_and_tables_and_hasher(capacity, tables, RandomState::new())
    }
}

impl<V> Default for CuckooHashSet<V>
where
    V: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> CuckooHashSet<V, S>
where
    V: Eq + Hash,
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

    /// Insert a value. Returns true on a fresh insertion; false means the
    /// value was already present.
    pub fn insert(&mut self, value: V) -> bool {
        self.raw.insert(Pair { key: value, value: () })
    }

    /// Read-only view of the stored value equal to the query.
    pub fn find<Q>(&self, value: &Q) -> Option<&V>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find(value).map(|entry| &entry.key)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(value)
    }

    /// Number of stored values equal to the query: 0 or 1.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.contains(value) as usize
    }

    /// Remove the value. Returns whether one was removed.
    pub fn erase<Q>(&mut self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.erase(value)
    }

    /// Remove the value and hand it to the caller.
    pub fn extract<Q>(&mut self, value: &Q) -> Option<V>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.extract(value).map(|entry| entry.key)
    }

    /// Remove every value matching the predicate; returns how many.
    pub fn erase_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        self.raw.erase_if(|entry| pred(&entry.key))
    }

    /// Count values matching the predicate.
    pub fn count_if<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        self.raw.count_if(|entry| pred(&entry.key))
    }

    /// Insert a sequence of values; one outcome per input, in input
    /// order. Later inputs observe the effects of earlier ones.
    pub fn insert_many<I>(&mut self, values: I) -> Vec<bool>
    where
        I: IntoIterator<Item = V>,
    {
        values.into_iter().map(|value| self.insert(value)).collect()
    }

    /// Erase a sequence of values; one outcome per input, in input order.
    pub fn erase_many<'q, Q, I>(&mut self, values: I) -> Vec<bool>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        values.into_iter().map(|value| self.erase(value)).collect()
    }

    /// Extract a sequence of values; one outcome per input, in input
    /// order.
    pub fn extract_many<'q, Q, I>(&mut self, values: I) -> Vec<Option<V>>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        values
            .into_iter()
            .map(|value| self.extract(value))
            .collect()
    }

    /// Empty the set; shape is kept.
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

    /// Walk live values. Order is unspecified and changes across
    /// structural mutations.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.raw.entries(),
        }
    }

    /// Read-only walk of the raw grid, one inner iterator per sub-table.
    pub fn tables(&self) -> Tables<'_, V> {
        Tables {
            rows: self.raw.rows().iter(),
        }
    }
}

impl<V, S> fmt::Debug for CuckooHashSet<V, S>
where
    V: Eq + Hash + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over `&V` for live values.
pub struct Iter<'a, V> {
    inner: raw_table::Entries<'a, V, (), SetSlot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| &entry.key)
    }
}

/// Iterator over sub-tables; each item walks that sub-table's slots.
pub struct Tables<'a, V> {
    rows: core::slice::Iter<'a, Vec<SetSlot<V>>>,
}

impl<'a, V> Iterator for Tables<'a, V> {
    type Item = TableSlots<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| TableSlots { slots: row.iter() })
    }
}

/// Iterator over one sub-table's slots: `None` for an empty slot,
/// `Some(&V)` for an occupied one.
pub struct TableSlots<'a, V> {
    slots: core::slice::Iter<'a, SetSlot<V>>,
}

impl<'a, V> Iterator for TableSlots<'a, V> {
    type Item = Option<&'a V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .next()
            .map(|slot| slot.get().map(|entry| &entry.key))
    }
}
