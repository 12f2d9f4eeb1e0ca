//! The shared cuckoo engine: placement, displacement, growth, queries.
//!
//! All four public containers are this engine specialised by slot layout.
//! Entries are [`Pair<K, V>`]; sets use `V = ()` so the value-as-key shape
//! reuses the same placement and query paths.

use crate::hash_family::position;
use crate::slot::{Pair, Slot};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

/// Default per-sub-table capacity at construction.
pub(crate) const DEFAULT_CAPACITY: usize = 64;
/// Default sub-table count at construction.
pub(crate) const DEFAULT_TABLES: usize = 2;

/// Displacement steps per sub-table before a walk escalates to growth.
const MAX_STEPS_PER_TABLE: f64 = 3.7;
/// Capacity growth factor used when `resize` is asked to pick a size.
const GROWTH_FACTOR: f64 = 1.75;

/// Step budget for a displacement walk with the given sub-table count.
fn max_steps_for(tables: usize) -> usize {
    (tables as f64 * MAX_STEPS_PER_TABLE) as usize + 1
}

fn empty_grid<St: Default>(tables: usize, capacity: usize) -> Vec<Vec<St>> {
    (0..tables)
        .map(|_| (0..capacity).map(|_| St::default()).collect())
        .collect()
}

/// Outcome of probing a key's candidate slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// An occupied candidate holds an equal key.
    Hit(usize, usize),
    /// No candidate holds the key; this is the first empty candidate.
    Free(usize, usize),
    /// Every candidate is occupied by another key; this is the step-0
    /// slot where an eviction walk starts.
    Collision(usize, usize),
}

/// The grid plus its placement state. `St` selects the slot layout
/// (inline entry or owned heap cell); `S` supplies the key hash.
pub(crate) struct RawCuckoo<K, V, St, S> {
    grid: Vec<Vec<St>>,
    capacity: usize,
    tables: usize,
    max_steps: usize,
    occupied: usize,
    hasher: S,
    _entries: PhantomData<Pair<K, V>>,
}

impl<K, V, St, S> RawCuckoo<K, V, St, S>
where
    K: Eq + Hash,
    St: Slot<Pair<K, V>>,
    S: BuildHasher,
{
    /// Shape is fixed by the caller: `capacity` slots in each of `tables`
    /// sub-tables. Two sub-tables is the floor for cuckoo displacement.
    pub(crate) fn with_shape_and_hasher(capacity: usize, tables: usize, hasher: S) -> Self {
        assert!(capacity >= 1, "capacity per sub-table must be at least 1");
        assert!(tables >= 2, "cuckoo hashing needs at least two sub-tables");
        Self {
            grid: empty_grid(tables, capacity),
            capacity,
            tables,
            max_steps: max_steps_for(tables),
            occupied: 0,
            hasher,
            _entries: PhantomData,
        }
    }

    #[inline]
    fn hash_key<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Walk the key's `tables` candidate slots and classify the outcome.
    ///
    /// A hit anywhere wins over an earlier empty candidate: a hole left by
    /// an erase before the key's live slot must not make the key look
    /// absent, or a re-insert would duplicate it.
    fn probe<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_key(q);
        let mut first_free = None;
        for step in 0..self.tables {
            let (t, s) = position(hash, step, self.tables, self.capacity);
            match self.grid[t][s].get() {
                Some(entry) if entry.key.borrow() == q => return Probe::Hit(t, s),
                Some(_) => {}
                None => {
                    if first_free.is_none() {
                        first_free = Some((t, s));
                    }
                }
            }
        }
        match first_free {
            Some((t, s)) => Probe::Free(t, s),
            None => {
                let (t, s) = position(hash, 0, self.tables, self.capacity);
                Probe::Collision(t, s)
            }
        }
    }

    /// Insert a new entry. Returns true on a fresh insertion, false when
    /// the key is already present (no mutation in that case).
    pub(crate) fn insert(&mut self, entry: Pair<K, V>) -> bool {
        match self.probe(&entry.key) {
            Probe::Hit(..) => false,
            Probe::Free(t, s) => {
                let displaced = self.grid[t][s].fill(entry);
                debug_assert!(displaced.is_none(), "free probe points at an empty slot");
                self.occupied += 1;
                true
            }
            Probe::Collision(t, s) => {
                let carrier = self.grid[t][s]
                    .fill(entry)
                    .expect("collision probe points at an occupied slot");
                self.displace(carrier, 1);
                self.occupied += 1;
                true
            }
        }
    }

    /// Insert or overwrite. Returns true on a fresh insertion, false when
    /// an existing value was overwritten.
    pub(crate) fn insert_or_assign(&mut self, entry: Pair<K, V>) -> bool {
        match self.probe(&entry.key) {
            Probe::Hit(t, s) => {
                self.grid[t][s]
                    .get_mut()
                    .expect("hit probe points at an occupied slot")
                    .value = entry.value;
                false
            }
            Probe::Free(t, s) => {
                let displaced = self.grid[t][s].fill(entry);
                debug_assert!(displaced.is_none(), "free probe points at an empty slot");
                self.occupied += 1;
                true
            }
            Probe::Collision(t, s) => {
                let carrier = self.grid[t][s]
                    .fill(entry)
                    .expect("collision probe points at an occupied slot");
                self.displace(carrier, 1);
                self.occupied += 1;
                true
            }
        }
    }

    /// Drive the carrier until it lands in an empty slot.
    ///
    /// Exactly one entry is in flight at any moment: writing the carrier
    /// into an occupied slot makes the previous occupant the new carrier.
    /// Exhausting the step budget grows the grid and restarts the walk;
    /// the carrier stays in hand across growth, so it is never lost even
    /// when growth itself has to cascade.
    fn displace(&mut self, mut carrier: Pair<K, V>, mut step: usize) {
        loop {
            if step >= self.max_steps {
                self.resize(0);
                step = 0;
                continue;
            }
            let hash = self.hash_key(&carrier.key);
            let (t, s) = position(hash, step, self.tables, self.capacity);
            match self.grid[t][s].fill(carrier) {
                None => return,
                Some(evicted) => {
                    carrier = evicted;
                    step += 1;
                }
            }
        }
    }

    /// Reshape to `new_capacity` slots per sub-table (0 picks the growth
    /// factor) and reinsert every live entry. Reinsertion may trigger
    /// further growth; that terminates because capacity strictly grows.
    pub(crate) fn resize(&mut self, new_capacity: usize) {
        let new_capacity = if new_capacity == 0 {
            (self.capacity as f64 * GROWTH_FACTOR) as usize + 1
        } else {
            new_capacity
        };
        self.capacity = new_capacity;
        let old_grid = core::mem::replace(&mut self.grid, empty_grid(self.tables, new_capacity));
        self.occupied = 0;
        for row in old_grid {
            for mut slot in row {
                if let Some(entry) = slot.take() {
                    let inserted = self.insert(entry);
                    debug_assert!(inserted, "live keys are unique before a reshape");
                }
            }
        }
    }

    /// Raise the sub-table count. Counts of two or less are rejected and
    /// leave the container untouched; otherwise the step budget is
    /// recomputed and the grid reshaped in place.
    pub(crate) fn restrain(&mut self, new_tables: usize) -> bool {
        if new_tables <= 2 {
            return false;
        }
        self.tables = new_tables;
        self.max_steps = max_steps_for(new_tables);
        self.resize(self.capacity);
        true
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<&Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.probe(q) {
            Probe::Hit(t, s) => self.grid[t][s].get(),
            _ => None,
        }
    }

    pub(crate) fn find_mut<Q>(&mut self, q: &Q) -> Option<&mut Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.probe(q) {
            Probe::Hit(t, s) => self.grid[t][s].get_mut(),
            _ => None,
        }
    }

    pub(crate) fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        matches!(self.probe(q), Probe::Hit(..))
    }

    /// Remove the entry for the key and hand it out.
    pub(crate) fn extract<Q>(&mut self, q: &Q) -> Option<Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.probe(q) {
            Probe::Hit(t, s) => {
                let entry = self.grid[t][s].take();
                debug_assert!(entry.is_some(), "hit probe points at an occupied slot");
                self.occupied -= 1;
                entry
            }
            _ => None,
        }
    }

    pub(crate) fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.extract(q).is_some()
    }

    pub(crate) fn erase_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Pair<K, V>) -> bool,
    {
        let mut erased = 0;
        for row in &mut self.grid {
            for slot in row {
                if slot.get().map_or(false, |entry| pred(entry)) {
                    slot.take();
                    erased += 1;
                }
            }
        }
        self.occupied -= erased;
        erased
    }

    pub(crate) fn count_if<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&Pair<K, V>) -> bool,
    {
        self.grid
            .iter()
            .flatten()
            .filter_map(|slot| slot.get())
            .filter(|entry| pred(entry))
            .count()
    }

    /// Empty every slot; shape is kept.
    pub(crate) fn clear(&mut self) {
        self.grid = empty_grid(self.tables, self.capacity);
        self.occupied = 0;
    }

    pub(crate) fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    pub(crate) fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.total_capacity() as f64
    }

    pub(crate) fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub(crate) fn tables_count(&self) -> usize {
        self.tables
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn total_capacity(&self) -> usize {
        self.capacity * self.tables
    }

    /// Raw sub-table rows, for the diagnostic grid views the facades
    /// expose.
    pub(crate) fn rows(&self) -> &[Vec<St>] {
        &self.grid
    }

    pub(crate) fn entries(&self) -> Entries<'_, K, V, St> {
        Entries {
            slots: self.grid.iter().flatten(),
            _pd: PhantomData,
        }
    }

    pub(crate) fn entries_mut(&mut self) -> EntriesMut<'_, K, V, St> {
        EntriesMut {
            slots: self.grid.iter_mut().flatten(),
            _pd: PhantomData,
        }
    }
}

/// Walk over live entries, sub-table by sub-table. Order is a diagnostic
/// affordance, not a contract.
pub(crate) struct Entries<'a, K, V, St> {
    slots: core::iter::Flatten<core::slice::Iter<'a, Vec<St>>>,
    _pd: PhantomData<&'a Pair<K, V>>,
}

impl<'a, K, V, St> Iterator for Entries<'a, K, V, St>
where
    St: Slot<Pair<K, V>>,
{
    type Item = &'a Pair<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(entry) = slot.get() {
                return Some(entry);
            }
        }
        None
    }
}

pub(crate) struct EntriesMut<'a, K, V, St> {
    slots: core::iter::Flatten<core::slice::IterMut<'a, Vec<St>>>,
    _pd: PhantomData<&'a Pair<K, V>>,
}

impl<'a, K, V, St> Iterator for EntriesMut<'a, K, V, St>
where
    St: Slot<Pair<K, V>>,
{
    type Item = &'a mut Pair<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(entry) = slot.get_mut() {
                return Some(entry);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{InlineSlot, NodeSlot};
    use core::hash::Hasher;
    use std::collections::hash_map::RandomState;

    type Inline = RawCuckoo<i32, i32, InlineSlot<Pair<i32, i32>>, RandomState>;
    type Node = RawCuckoo<i32, i32, NodeSlot<Pair<i32, i32>>, RandomState>;

    fn inline(capacity: usize, tables: usize) -> Inline {
        RawCuckoo::with_shape_and_hasher(capacity, tables, RandomState::new())
    }

    fn pair(key: i32, value: i32) -> Pair<i32, i32> {
        Pair { key, value }
    }

    /// Hasher that sends every key to one bucket chain, so probes and
    /// displacement walks are exercised deterministically: with two
    /// sub-tables, step 0 and step 1 always name distinct cells.
    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    type Degenerate = RawCuckoo<i32, i32, InlineSlot<Pair<i32, i32>>, ConstBuildHasher>;

    /// Invariant: after insert(k, v) returns true, find(k) yields v.
    #[test]
    fn insert_then_find() {
        let mut m = inline(64, 2);
        assert!(m.insert(pair(2004, 7)));
        assert_eq!(m.find(&2004).map(|p| p.value), Some(7));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: a duplicate insert is a no-op returning false.
    #[test]
    fn duplicate_insert_rejected() {
        let mut m = inline(64, 2);
        assert!(m.insert(pair(5, 1)));
        assert!(!m.insert(pair(5, 2)));
        assert_eq!(m.find(&5).map(|p| p.value), Some(1));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: insert_or_assign overwrites on a hit and reports false.
    #[test]
    fn insert_or_assign_overwrites() {
        let mut m = inline(64, 2);
        assert!(m.insert_or_assign(pair(5, 1)));
        assert!(!m.insert_or_assign(pair(5, 2)));
        assert_eq!(m.find(&5).map(|p| p.value), Some(2));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: an erase-hole at an earlier candidate must not hide a
    /// key living at a later candidate.
    ///
    /// With the degenerate hasher and two sub-tables, every key shares the
    /// candidate list (table 0, s0), (table 1, s1). k2 lands at the step-1
    /// cell because k1 occupies the step-0 cell; erasing k1 then leaves a
    /// hole in front of k2's live slot.
    #[test]
    fn hole_before_live_slot_does_not_duplicate() {
        let mut m: Degenerate = RawCuckoo::with_shape_and_hasher(64, 2, ConstBuildHasher);
        assert!(m.insert(pair(1, 10)));
        assert!(m.insert(pair(2, 20)));
        assert!(m.erase(&1));

        assert!(!m.insert(pair(2, 99)), "key 2 is still live");
        assert_eq!(m.len(), 1);
        assert_eq!(m.find(&2).map(|p| p.value), Some(20));
        assert!(m.contains(&2));
    }

    /// Invariant: keys sharing a hash fill their shared candidate cells,
    /// one per sub-table, and stay individually findable through the full
    /// candidate scan.
    #[test]
    fn shared_hash_keys_occupy_distinct_tables() {
        let mut m: Degenerate = RawCuckoo::with_shape_and_hasher(64, 2, ConstBuildHasher);
        assert!(m.insert(pair(1, 10)));
        assert!(m.insert(pair(2, 20)));
        assert_eq!(m.len(), 2);
        assert_eq!(m.find(&1).map(|p| p.value), Some(10));
        assert_eq!(m.find(&2).map(|p| p.value), Some(20));
        assert!(!m.insert(pair(1, 0)));
        assert!(!m.insert(pair(2, 0)));
    }

    /// Invariant: sustained insertion grows capacity and keeps every
    /// pre-growth entry findable; the occupancy count stays exact.
    #[test]
    fn growth_under_pressure_preserves_entries() {
        let mut m = inline(1, 2);
        for k in 0..50 {
            assert!(m.insert(pair(k, -k)));
        }
        assert!(m.capacity() > 1, "growth must have occurred");
        assert_eq!(m.len(), 50);
        assert_eq!(m.entries().count(), 50);
        for k in 0..50 {
            assert_eq!(m.find(&k).map(|p| p.value), Some(-k));
        }
        let expected = 50.0 / m.total_capacity() as f64;
        assert!((m.load_factor() - expected).abs() < f64::EPSILON);
    }

    /// Invariant: an explicit resize preserves the live entry set, for
    /// both growth and a reinsert-driven shrink request.
    #[test]
    fn resize_preserves_entries() {
        let mut m = inline(8, 2);
        for k in 0..10 {
            m.insert(pair(k, k));
        }
        m.resize(64);
        assert_eq!(m.capacity(), 64);
        assert_eq!(m.len(), 10);
        for k in 0..10 {
            assert!(m.contains(&k));
        }

        // A smaller request reinserts through the growth path until
        // everything fits again.
        m.resize(2);
        assert_eq!(m.len(), 10);
        for k in 0..10 {
            assert!(m.contains(&k));
        }
    }

    /// Invariant: restrain rejects counts of two or less without touching
    /// state, and otherwise reshapes while preserving entries.
    #[test]
    fn restrain_gate_and_reshape() {
        let mut m = inline(16, 2);
        for k in 0..12 {
            m.insert(pair(k, k));
        }
        let (cap, tables, len) = (m.capacity(), m.tables_count(), m.len());

        assert!(!m.restrain(2));
        assert!(!m.restrain(1));
        assert!(!m.restrain(0));
        assert_eq!((m.capacity(), m.tables_count(), m.len()), (cap, tables, len));

        assert!(m.restrain(4));
        assert_eq!(m.tables_count(), 4);
        assert_eq!(m.len(), 12);
        for k in 0..12 {
            assert!(m.contains(&k));
        }
    }

    /// Invariant: extract hands the stored entry out and empties the slot.
    #[test]
    fn extract_removes_and_returns() {
        let mut m = inline(64, 2);
        m.insert(pair(7, 70));
        let got = m.extract(&7);
        assert_eq!(got, Some(pair(7, 70)));
        assert!(!m.contains(&7));
        assert_eq!(m.len(), 0);
        assert_eq!(m.extract(&7), None);
    }

    /// Invariant: erase_if removes exactly the matching entries and the
    /// occupancy count follows; count_if never mutates.
    #[test]
    fn erase_if_and_count_if() {
        let mut m = inline(64, 2);
        for k in 0..20 {
            m.insert(pair(k, k));
        }
        assert_eq!(m.count_if(|p| p.key % 2 == 0), 10);
        assert_eq!(m.len(), 20);

        let erased = m.erase_if(|p| p.key % 2 == 0);
        assert_eq!(erased, 10);
        assert_eq!(m.len(), 10);
        assert_eq!(m.count_if(|p| p.key % 2 == 0), 0);
        for k in (1..20).step_by(2) {
            assert!(m.contains(&k));
        }
    }

    /// Invariant: clear empties every slot and keeps the shape.
    #[test]
    fn clear_keeps_shape() {
        let mut m = inline(8, 3);
        for k in 0..5 {
            m.insert(pair(k, k));
        }
        m.clear();
        assert_eq!(m.len(), 0);
        assert_eq!(m.load_factor(), 0.0);
        assert_eq!(m.capacity(), 8);
        assert_eq!(m.tables_count(), 3);
        assert!(!m.contains(&0));
    }

    /// Invariant: swap exchanges the entire state of two grids.
    #[test]
    fn swap_exchanges_state() {
        let mut a = inline(8, 2);
        let mut b = inline(32, 3);
        a.insert(pair(1, 1));
        b.insert(pair(2, 2));
        b.insert(pair(3, 3));

        a.swap(&mut b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.capacity(), 32);
        assert_eq!(a.tables_count(), 3);
        assert!(a.contains(&2) && a.contains(&3));
        assert_eq!(b.len(), 1);
        assert!(b.contains(&1));
    }

    /// Invariant: the node layout behaves identically through the same
    /// engine, without requiring default construction of entries.
    #[test]
    fn node_layout_matches_inline_behavior() {
        let mut m: Node = RawCuckoo::with_shape_and_hasher(1, 2, RandomState::new());
        for k in 0..30 {
            assert!(m.insert(pair(k, k + 100)));
        }
        assert!(!m.insert(pair(0, 0)));
        for k in 0..30 {
            assert_eq!(m.find(&k).map(|p| p.value), Some(k + 100));
        }
        assert_eq!(m.extract(&3), Some(pair(3, 103)));
        assert_eq!(m.len(), 29);
    }

    /// Invariant: the maintained occupancy count equals a full-grid scan
    /// after a mixed op sequence.
    #[test]
    fn occupancy_count_matches_scan() {
        let mut m = inline(4, 2);
        for k in 0..40 {
            m.insert(pair(k, k));
        }
        for k in (0..40).step_by(3) {
            m.erase(&k);
        }
        m.insert_or_assign(pair(1, -1));
        m.insert_or_assign(pair(400, -400));
        assert_eq!(m.len(), m.entries().count());
        let expected = m.len() as f64 / m.total_capacity() as f64;
        assert!((m.load_factor() - expected).abs() < f64::EPSILON);
    }
}
