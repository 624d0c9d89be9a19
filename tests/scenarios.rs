//! The six literal end-to-end scenarios from §8 of the design notes.

use ctrlmap::CtrlMap;

#[test]
fn basic_sum() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();
    for i in 0..5u64 {
        map.put(i, i).unwrap();
    }

    let key_sum: u64 = map.iter().map(|(k, _)| *k).sum();
    assert_eq!(key_sum, 10);

    let value_sum: u64 = (0..5u64).map(|i| *map.get(&i).unwrap()).sum();
    assert_eq!(value_sum, 10);
}

#[test]
fn reserve_sizing() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();

    map.reserve(9);
    assert_eq!(map.capacity(), 16);

    map.reserve(129);
    assert_eq!(map.capacity(), 256);

    map.reserve(127);
    assert_eq!(map.capacity(), 256);

    assert_eq!(map.len(), 0);
}

#[test]
fn clear_retains_capacity() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();
    map.put(1, 1).unwrap();
    let cap = map.capacity();
    assert!(cap > 0);

    map.clear_retaining_capacity();
    map.clear_retaining_capacity();

    assert_eq!(map.len(), 0);
    assert_eq!(map.capacity(), cap);
    assert!(!map.contains_key(&1));
}

#[test]
fn grow_stress() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();
    for i in 0..=12_455u64 {
        map.put(i, i).unwrap();
    }
    assert_eq!(map.len(), 12_456);
    for i in 0..=12_455u64 {
        assert_eq!(map.get(&i), Some(&i));
    }
}

#[test]
fn removal_pattern() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();
    for i in 0..=15u64 {
        map.put(i, i).unwrap();
    }
    for i in (0..=15u64).filter(|i| i % 3 == 0) {
        map.remove(&i);
    }
    assert_eq!(map.len(), 10);
    for i in 0..=15u64 {
        if i % 3 == 0 {
            assert!(!map.contains_key(&i));
        } else {
            assert_eq!(map.get(&i), Some(&i));
        }
    }
}

#[test]
fn reinsert_after_tombstone() {
    let mut map: CtrlMap<u64, u64> = CtrlMap::new();
    for i in 0..=15u64 {
        map.put(i, i).unwrap();
    }
    for i in [7u64, 15, 14, 13] {
        map.remove(&i);
    }
    for i in [15u64, 13, 14, 7] {
        map.put(i, i).unwrap();
    }
    for i in 0..=15u64 {
        assert_eq!(map.get(&i), Some(&i));
    }
}
