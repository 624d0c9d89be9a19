//! The `Entry` API (§4.5's `getOrPut` family, generalized).
//!
//! The spec's `getOrPut` contract is, taken literally, a foot-gun: it
//! commits the slot's metadata *before* the caller has written a value
//! into it, so any call the caller makes on the map between `getOrPut`
//! returning and the caller finishing the write observes a slot that
//! looks occupied but holds whatever bytes used to be there (§9, "open
//! question: getOrPut exposes a window of uninitialized/stale data"). The
//! teacher has no precedent for this shape at all — its own `insert`
//! (`src/index/hash/mod.rs`) always writes a complete value in the same
//! call — so this crate resolves the open question by borrowing Rust's
//! own standard-library answer to the same problem instead of inventing
//! one: `VacantEntry` holds `&mut CtrlMap` and defers the metadata write
//! until `insert` is called on it, so the borrow checker makes the
//! caller-discipline the spec merely documents into something the type
//! system enforces. No other map method is reachable while a `VacantEntry`
//! is alive.

use std::hash::{BuildHasher, Hash};

use crate::error::Result;
use crate::map::{make_hash, CtrlMap};
use crate::raw::alloc::RawAllocator;

/// Either occupied or vacant for whatever key produced it.
pub enum Entry<'a, K, V, S, A: RawAllocator, const P: usize> {
    Occupied(OccupiedEntry<'a, K, V, S, A, P>),
    Vacant(VacantEntry<'a, K, V, S, A, P>),
}

impl<'a, K, V, S, A, const P: usize> Entry<'a, K, V, S, A, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: RawAllocator,
{
    pub(crate) fn new(
        map: &'a mut CtrlMap<K, V, S, A, P>,
        key: K,
        hash: u64,
        allow_grow: bool,
    ) -> Result<Self> {
        // Disjoint field borrows: `hash_of` reads `map.hash_builder` while
        // `find_or_prepare_insert` mutates `map.table`, so both can be held
        // at once even though both flow through the same `&mut CtrlMap`.
        let hash_builder = &map.hash_builder;
        let hash_of = |pair: &(K, V)| make_hash(hash_builder, &pair.0);
        let (index, found) =
            map.table
                .find_or_prepare_insert(hash, |pair| pair.0 == key, allow_grow, &hash_of)?;
        Ok(if found {
            Entry::Occupied(OccupiedEntry { map, index })
        } else {
            Entry::Vacant(VacantEntry {
                map,
                key,
                hash,
                index,
            })
        })
    }

    /// Inserts `value` if vacant, otherwise returns the existing value,
    /// mirroring `std::collections::HashMap::Entry::or_insert`.
    pub fn or_insert(self, value: V) -> &'a mut V {
        match self {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(value),
        }
    }

    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(default()),
        }
    }

    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(occupied) => occupied.key(),
            Entry::Vacant(vacant) => vacant.key(),
        }
    }
}

pub struct OccupiedEntry<'a, K, V, S, A: RawAllocator, const P: usize> {
    map: &'a mut CtrlMap<K, V, S, A, P>,
    index: usize,
}

impl<'a, K, V, S, A: RawAllocator, const P: usize> OccupiedEntry<'a, K, V, S, A, P> {
    pub fn key(&self) -> &K {
        // SAFETY: `index` was returned as occupied by `find_or_prepare_insert`
        // and no mutation has happened since.
        &unsafe { self.map.table.entry_at(self.index) }.0
    }

    pub fn get(&self) -> &V {
        // SAFETY: see `key`.
        &unsafe { self.map.table.entry_at(self.index) }.1
    }

    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: see `key`.
        &mut unsafe { self.map.table.entry_at_mut(self.index) }.1
    }

    pub fn into_mut(self) -> &'a mut V {
        // SAFETY: see `key`; the borrow is extended to `'a` because this
        // consumes the entry, matching `self.map`'s own lifetime.
        &mut unsafe { self.map.table.entry_at_mut(self.index) }.1
    }

    /// Replaces the value, returning the one that was there.
    pub fn insert(&mut self, value: V) -> V {
        std::mem::replace(self.get_mut(), value)
    }

    /// Removes this entry from the map, returning its value.
    pub fn remove(self) -> V {
        self.map.table.remove_at(self.index).1
    }
}

pub struct VacantEntry<'a, K, V, S, A: RawAllocator, const P: usize> {
    map: &'a mut CtrlMap<K, V, S, A, P>,
    key: K,
    hash: u64,
    index: usize,
}

impl<'a, K, V, S, A: RawAllocator, const P: usize> VacantEntry<'a, K, V, S, A, P> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn into_key(self) -> K {
        self.key
    }

    /// Commits the slot: writes the metadata byte and the value together,
    /// in the same call — the resolution to the deferred-commit design
    /// documented on [`Entry`].
    pub fn insert(self, value: V) -> &'a mut V {
        let ptr = self.map.table.commit_insert(self.index, self.hash, (self.key, value));
        // SAFETY: `commit_insert` just initialized this slot; nothing else
        // can alias it before this borrow is returned.
        &mut unsafe { &mut *ptr }.1
    }
}
