//! The public map type (§3, §4): `CtrlMap<K, V, S, A, P>`.
//!
//! Generalizes the teacher's `HashTable<K, V>` wrapper
//! (`src/index/hash/mod.rs`) — which pairs a `RawTable<(K, Entry<V>)>` with
//! an `fxhash::FxBuildHasher` and exposes `insert`/`get`/`get_mut` — into
//! the spec's full five-variant insert surface, `reserve`, both removal
//! forms, and the two clear operations, parameterized over the allocator
//! and the fixed `MaxLoadPercentage` the spec requires (§4.2: "fixed at
//! construction time; not a runtime-mutable field").

use std::hash::{BuildHasher, Hash};

use crate::entry::Entry;
use crate::error::Result;
use crate::raw::alloc::{Global, RawAllocator};
use crate::raw::table::RawTable;

/// The teacher's default `BuildHasher` (`src/index/hash/mod.rs`), kept as
/// this crate's default too: `fxhash` is already a project dependency and
/// well suited to small fixed-size keys.
pub type DefaultHashBuilder = fxhash::FxBuildHasher;

/// An open-addressed `K -> V` map with a single metadata byte per slot and
/// one allocation per table (§3, §4.1).
///
/// `P` is `MaxLoadPercentage` (§4.2), fixed at the type level with the
/// spec's own default of 80. Constructing a map with `P` outside `(0,
/// 100)` panics — the spec requires rejecting such values, and there is
/// no sensible fallback to substitute.
pub struct CtrlMap<K, V, S = DefaultHashBuilder, A: RawAllocator = Global, const P: usize = 80> {
    pub(crate) hash_builder: S,
    pub(crate) table: RawTable<(K, V), A>,
}

#[inline]
pub(crate) fn make_hash<K: Hash + ?Sized, S: BuildHasher>(hash_builder: &S, key: &K) -> u64 {
    hash_builder.hash_one(key)
}

impl<K, V, const P: usize> CtrlMap<K, V, DefaultHashBuilder, Global, P>
where
    K: Hash + Eq,
{
    /// Empty map with no backing allocation yet (§4.1: `capacity == 0` is
    /// a valid, representable state).
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).expect("allocation failure constructing CtrlMap")
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S, const P: usize> Default for CtrlMap<K, V, S, Global, P>
where
    K: Hash + Eq,
    S: Default + BuildHasher,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S, A, const P: usize> CtrlMap<K, V, S, A, P>
where
    A: RawAllocator,
{
    #[inline]
    fn assert_valid_max_load_percentage() {
        assert!(
            crate::capacity::is_valid_max_load_percentage(P),
            "MaxLoadPercentage must be in (0, 100), got {P}"
        );
    }
}

impl<K, V, S, const P: usize> CtrlMap<K, V, S, Global, P>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::assert_valid_max_load_percentage();
        CtrlMap {
            hash_builder,
            table: RawTable::new(Global, P),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::try_with_capacity_and_hasher(capacity, hash_builder)
            .expect("allocation failure constructing CtrlMap")
    }

    pub fn try_with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Self::assert_valid_max_load_percentage();
        let mut map = CtrlMap {
            hash_builder,
            table: RawTable::new(Global, P),
        };
        if capacity > 0 {
            map.try_reserve(capacity)?;
        }
        Ok(map)
    }
}

impl<K, V, S, A, const P: usize> CtrlMap<K, V, S, A, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: RawAllocator,
{
    pub fn with_hasher_in(hash_builder: S, allocator: A) -> Self {
        Self::assert_valid_max_load_percentage();
        CtrlMap {
            hash_builder,
            table: RawTable::new(allocator, P),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    #[inline]
    pub(crate) fn hash_of(&self, key: &K) -> u64 {
        make_hash(&self.hash_builder, key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_of(key);
        let idx = self.table.find(hash, |entry| &entry.0 == key)?;
        // SAFETY: `idx` was just returned as a used slot by `find`.
        Some(&unsafe { self.table.entry_at(idx) }.1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_of(key);
        let idx = self.table.find(hash, |entry| &entry.0 == key)?;
        // SAFETY: `idx` was just returned as a used slot by `find`.
        Some(&mut unsafe { self.table.entry_at_mut(idx) }.1)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.hash_of(key);
        let idx = self.table.find(hash, |entry| &entry.0 == key)?;
        // SAFETY: `idx` was just returned as a used slot by `find`.
        let (k, v) = unsafe { self.table.entry_at(idx) };
        Some((k, v))
    }

    /// §4.5 `getOrPut`: the vacant/occupied split on the public API.
    /// Metadata commitment is deferred until [`crate::entry::VacantEntry::insert`]
    /// is actually called — see `src/entry.rs` for why this is a safer
    /// refinement of the spec's literal "uninitialized value" contract
    /// rather than a silent deviation from it.
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V, S, A, P>> {
        let hash = self.hash_of(&key);
        Entry::new(self, key, hash, true)
    }

    /// §4.5 `getOrPutAssumeCapacity`: identical, but never grows — the
    /// caller has already `reserve`d enough room, checked by
    /// `debug_assert!` rather than enforced by allocating.
    pub fn entry_assume_capacity(&mut self, key: K) -> Entry<'_, K, V, S, A, P> {
        let hash = self.hash_of(&key);
        Entry::new(self, key, hash, false)
            .expect("entry_assume_capacity cannot fail: it never allocates")
    }

    /// §4.5 `put`: insert, overwriting any existing value for `key` and
    /// returning it.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.entry(key)? {
            Entry::Occupied(mut occupied) => Ok(Some(occupied.insert(value))),
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                Ok(None)
            }
        }
    }

    /// §4.5 `putNoClobber`: insert only if absent; a precondition
    /// violation (debug assert / release UB) if `key` is already present.
    pub fn put_no_clobber(&mut self, key: K, value: V) -> Result<()> {
        match self.entry(key)? {
            Entry::Occupied(_) => {
                debug_assert!(false, "put_no_clobber called with a key already present");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(value);
            }
        }
        Ok(())
    }

    /// §4.5 `putAssumeCapacityNoClobber`: neither allocates nor clobbers;
    /// both preconditions are asserted rather than checked.
    pub fn put_assume_capacity_no_clobber(&mut self, key: K, value: V) {
        match self.entry_assume_capacity(key) {
            Entry::Occupied(_) => {
                debug_assert!(
                    false,
                    "put_assume_capacity_no_clobber called with a key already present"
                );
            }
            Entry::Vacant(vacant) => {
                vacant.insert(value);
            }
        }
    }

    /// Removes `key` if present, returning its value. The "remove-if-
    /// present" half of the §9-flagged removal ambiguity — see DESIGN.md.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_of(key);
        self.table.remove(hash, |entry| &entry.0 == key).map(|(_, v)| v)
    }

    /// Removes `key`, asserting it was present. The "remove-or-assert"
    /// half of the §9-flagged removal ambiguity — panics (debug) /
    /// proceeds on a `None` read (release) if `key` was absent, matching
    /// the precondition-violation discipline used elsewhere.
    pub fn remove_assert(&mut self, key: &K) -> V {
        match self.remove(key) {
            Some(v) => v,
            None => {
                debug_assert!(false, "remove_assert called with a key that was not present");
                unreachable!("remove_assert precondition violated in a release build")
            }
        }
    }

    /// §4.8 `reserve`: ensures room for `additional` more entries without
    /// triggering an internal grow, short-circuiting if already satisfied.
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional)
            .expect("allocation failure during reserve")
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        // Disjoint field borrows: `hash_of` reads `self.hash_builder` while
        // `reserve` mutates `self.table`.
        let hash_builder = &self.hash_builder;
        let hash_of = move |pair: &(K, V)| make_hash(hash_builder, &pair.0);
        self.table.reserve(additional, &hash_of)
    }

    /// §4.8 `clearRetainingCapacity`.
    pub fn clear_retaining_capacity(&mut self) {
        self.table.clear_retaining_capacity();
    }

    /// §4.8 `clearAndFree` — see DESIGN.md for the allocator-parameter
    /// open question this resolves (the table already owns the allocator
    /// that produced its block, so no separate allocator argument is
    /// needed here, unlike the source API this was distilled from).
    pub fn clear_and_free(&mut self) {
        self.table.clear_and_free();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }
}

impl<K, V, S, const P: usize> CtrlMap<K, V, S, Global, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// §4.8 `clone`: a fresh table sized by `capacityForSize(len)` (§4.6),
    /// never carrying over tombstones — every copied entry lands on a
    /// clean probe chain in the new allocation.
    pub fn try_clone(&self) -> Result<Self> {
        let mut cloned = Self::try_with_capacity_and_hasher(self.len(), self.hash_builder.clone())?;
        for (k, v) in self.iter() {
            cloned
                .put_no_clobber(k.clone(), v.clone())
                .expect("freshly sized clone target cannot need to grow");
        }
        Ok(cloned)
    }
}

impl<K, V, S, const P: usize> Clone for CtrlMap<K, V, S, Global, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        self.try_clone().expect("allocation failure cloning CtrlMap")
    }
}

/// Iterator over `&(K, V)` pairs in unspecified, single-pass order (§4.7).
pub struct Iter<'a, K, V> {
    inner: crate::raw::iter::RawIter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S, A, const P: usize> IntoIterator for &'a CtrlMap<K, V, S, A, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: RawAllocator,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
