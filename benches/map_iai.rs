use cuckoo_containers::CuckooHashMap;
use iai::black_box;

const OPS: usize = 1_000;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn populated(seed: u64, n: usize) -> CuckooHashMap<i64, u64> {
    let mut m = CuckooHashMap::new();
    for (i, x) in lcg(seed).take(n).enumerate() {
        m.insert(x as i64, i as u64);
    }
    m
}

fn cuckoo_insert_1000_ops() -> CuckooHashMap<i64, u64> {
    let mut m = CuckooHashMap::new();
    for (i, x) in lcg(1).take(OPS).enumerate() {
        m.insert(black_box(x as i64), i as u64);
    }
    m
}

fn cuckoo_find_hit_1000_ops() -> u64 {
    let m = populated(7, OPS * 2);
    let mut acc = 0u64;
    for x in lcg(7).take(OPS) {
        if let Some(v) = m.find(&black_box(x as i64)) {
            acc = acc.wrapping_add(*v);
        }
    }
    acc
}

fn cuckoo_find_miss_1000_ops() -> usize {
    let m = populated(9, OPS);
    let mut hits = 0usize;
    for x in lcg(10).take(OPS) {
        hits += m.contains(&black_box((x as i64) ^ 1)) as usize;
    }
    hits
}

fn cuckoo_erase_1000_ops() -> CuckooHashMap<i64, u64> {
    let mut m = populated(11, OPS * 2);
    for x in lcg(11).take(OPS) {
        m.erase(&black_box(x as i64));
    }
    m
}

iai::main!(
    cuckoo_insert_1000_ops,
    cuckoo_find_hit_1000_ops,
    cuckoo_find_miss_1000_ops,
    cuckoo_erase_1000_ops
);
