//! Property-based checks for §3's invariants and §8's universal properties,
//! driven by random sequences of `put`/`remove`/`clear*`/`reserve`.
//!
//! `CtrlMap` doesn't expose its raw metadata, so these tests observe the
//! invariants through the public surface (`len`, `capacity`, `get`,
//! `contains_key`, `iter`) rather than peeking at control bytes directly —
//! exactly the boundary a caller of this crate is limited to as well.

use std::collections::HashMap as StdHashMap;

use ctrlmap::CtrlMap;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Put(u16, u16),
    Remove(u16),
    ClearRetaining,
    ClearAndFree,
    Reserve(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<u16>(), any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
        2 => any::<u16>().prop_map(Op::Remove),
        1 => Just(Op::ClearRetaining),
        1 => Just(Op::ClearAndFree),
        1 => any::<u8>().prop_map(Op::Reserve),
    ]
}

proptest! {
    /// §8: `get`/`contains_key` track a reference `std::collections::HashMap`
    /// through any sequence of mutating operations, and `capacity`/`len`
    /// stay consistent with the MaxLoadPercentage = 80 the default type
    /// parameter fixes.
    #[test]
    fn tracks_a_reference_map(ops in prop::collection::vec(op_strategy(), 0..400)) {
        let mut map: CtrlMap<u16, u16> = CtrlMap::new();
        let mut model: StdHashMap<u16, u16> = StdHashMap::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let prev = map.put(k, v).unwrap();
                    let model_prev = model.insert(k, v);
                    prop_assert_eq!(prev, model_prev);
                }
                Op::Remove(k) => {
                    let removed = map.remove(&k);
                    let model_removed = model.remove(&k);
                    prop_assert_eq!(removed, model_removed);
                }
                Op::ClearRetaining => {
                    map.clear_retaining_capacity();
                    model.clear();
                }
                Op::ClearAndFree => {
                    map.clear_and_free();
                    model.clear();
                }
                Op::Reserve(n) => {
                    map.reserve(n as usize);
                }
            }

            // Invariant 2/3 (§3): load never exceeds 80% of capacity, and
            // `len` matches the number of live keys exactly.
            prop_assert_eq!(map.len(), model.len());
            if map.capacity() > 0 {
                prop_assert!(map.len() <= map.capacity() * 80 / 100);
            }

            for (k, v) in &model {
                prop_assert_eq!(map.get(k), Some(v));
                prop_assert!(map.contains_key(k));
            }
        }

        // Round-trip: iterating yields exactly the model's key set.
        let mut map_keys: Vec<u16> = map.iter().map(|(k, _)| *k).collect();
        let mut model_keys: Vec<u16> = model.keys().copied().collect();
        map_keys.sort_unstable();
        model_keys.sort_unstable();
        prop_assert_eq!(map_keys, model_keys);
    }

    /// §8 "Growth preservation": every key inserted before a grow-triggering
    /// insert is still retrievable afterward.
    #[test]
    fn growth_preserves_prior_entries(keys in prop::collection::hash_set(any::<u32>(), 0..3000)) {
        let mut map: CtrlMap<u32, u32> = CtrlMap::new();
        let mut inserted = Vec::new();
        for k in keys {
            map.put(k, k).unwrap();
            inserted.push(k);
            for &already in &inserted {
                prop_assert_eq!(map.get(&already), Some(&already));
            }
        }
    }

    /// §8 "Idempotence": `put(k, v); put(k, v)` matches a single `put`.
    #[test]
    fn put_is_idempotent(k in any::<u32>(), v in any::<u32>()) {
        let mut once: CtrlMap<u32, u32> = CtrlMap::new();
        once.put(k, v).unwrap();

        let mut twice: CtrlMap<u32, u32> = CtrlMap::new();
        twice.put(k, v).unwrap();
        twice.put(k, v).unwrap();

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.get(&k), twice.get(&k));
    }

    /// §8 "Reverse-removal": inserting 0..N then removing N-1..=0 leaves
    /// every still-present key retrievable at every step, ending empty.
    #[test]
    fn reverse_removal_keeps_the_map_consistent(n in 1u32..500) {
        let mut map: CtrlMap<u32, u32> = CtrlMap::new();
        for i in 0..n {
            map.put(i, i).unwrap();
        }
        for i in (0..n).rev() {
            let removed = map.remove(&i);
            prop_assert_eq!(removed, Some(i));
            for j in 0..i {
                prop_assert_eq!(map.get(&j), Some(&j));
            }
        }
        prop_assert_eq!(map.len(), 0);
    }
}
