//! Step-mixed hash family for the sub-table grid.
//!
//! Every displacement step gets its own logical hash. The sub-table is the
//! step rotation `step % tables`, so the first `tables` steps visit
//! pairwise-distinct sub-tables before any repetition. The slot seeds the
//! SplitMix64 finalizer with the sub-table index and folds that into the
//! user key hash, giving each key exactly one candidate cell per
//! sub-table. Positions are therefore periodic in the step: a displacement
//! walk only ever writes a key into one of its `tables` canonical
//! candidates, which is what keeps lookups complete at `tables` probes.

/// SplitMix64 finalizer. Full-avalanche 64-bit mixer.
#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x
}

/// Candidate position of a key hash at the given displacement step.
///
/// Pure and deterministic for fixed `(hash, step, tables, capacity)`.
#[inline]
pub(crate) fn position(hash: u64, step: usize, tables: usize, capacity: usize) -> (usize, usize) {
    let table = step % tables;
    let slot = (mix64(hash ^ mix64(table as u64)) % capacity as u64) as usize;
    (table, slot)
}
