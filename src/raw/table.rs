//! `RawTable<T, A>`: the allocator-driven engine behind `CtrlMap` (§3, §4).
//!
//! Generalizes the teacher's `RawTable<T>` (`src/index/hash/table.rs`) in
//! three load-bearing ways:
//!
//! 1. The teacher never grows — it's a fixed-capacity cache that *evicts*
//!    (`clear_safe_bucket`/`evict_mod_bucket`) instead of reallocating once
//!    `growth_left` hits zero. This spec requires true growth (§4.3, §5),
//!    so `grow`/`reserve` here have no direct teacher counterpart; they
//!    implement the allocate-rehash-free discipline the design notes
//!    describe directly (§5: "grow allocates a new block, copies, then
//!    frees the old"), threading a caller-supplied `hash_of` closure
//!    through exactly the way the teacher threads one into its own
//!    insert (`src/index/hash/mod.rs`: `self.table.insert(hash, (k, v),
//!    |x| make_hash(hash_builder, &x.0))`).
//! 2. The teacher's control byte is a SIMD group; this one is scalar
//!    (`control`/`probe` modules), so lookups and insertions here walk one
//!    slot at a time instead of one `Group::WIDTH`-wide chunk at a time.
//! 3. Vacant-slot commitment is deferred to the caller (`commit_insert`)
//!    instead of happening inside `find`/`insert` as the teacher's
//!    `find_insert_slot` does — see `crate::entry` for why.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::capacity::{capacity_for_size, max_load, MIN_CAPACITY};
use crate::error::Result;
use crate::raw::alloc::{try_alloc, Global, RawAllocator};
use crate::raw::control::{fingerprint_of, Control};
use crate::raw::iter::RawIter;
use crate::raw::layout::{layout_for_capacity, Header};
use crate::raw::probe::ProbeSeq;

/// Outcome of scanning a probe chain for an insertion target.
pub(crate) enum ScanOutcome {
    /// An existing slot holds an equal key, at this index.
    Found(usize),
    /// No equal key on the chain; this index is the slot to install into
    /// (either the first empty slot, or — per §4.4's "implementers may
    /// choose" clause — the first tombstone encountered on the same
    /// chain).
    Vacant(usize),
    /// The table has no backing allocation at all (`capacity == 0`).
    NeedsAllocation,
}

pub(crate) struct RawTable<T, A: RawAllocator = Global> {
    /// Points at `metadata[0]`, or dangling when `capacity == 0`.
    metadata: NonNull<u8>,
    capacity: usize,
    size: usize,
    available: usize,
    max_load_percentage: usize,
    allocator: A,
    _marker: PhantomData<T>,
}

impl<T, A: RawAllocator> RawTable<T, A> {
    #[inline]
    pub(crate) fn new(allocator: A, max_load_percentage: usize) -> Self {
        debug_assert!(crate::capacity::is_valid_max_load_percentage(
            max_load_percentage
        ));
        RawTable {
            metadata: NonNull::dangling(),
            capacity: 0,
            size: 0,
            available: 0,
            max_load_percentage,
            allocator,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// `size + tombstones`: occupied-or-previously-occupied slots (§3's
    /// "Load"). Derived from the invariant `available = max_load -
    /// (size + tombstones)` rather than tracked separately.
    #[inline]
    fn load(&self) -> usize {
        if self.capacity == 0 {
            0
        } else {
            max_load(self.capacity, self.max_load_percentage) - self.available
        }
    }

    #[inline]
    fn header_ptr(&self) -> *mut Header {
        debug_assert!(self.capacity > 0);
        // SAFETY: the header lives exactly `size_of::<Header>()` bytes
        // before the metadata region (§4.1), established in `resize_to`.
        unsafe {
            self.metadata
                .as_ptr()
                .sub(std::mem::size_of::<Header>())
                .cast::<Header>()
        }
    }

    #[inline]
    fn header(&self) -> &Header {
        // SAFETY: only called when `capacity > 0`, so `header_ptr` points
        // at a live `Header` written by `resize_to`.
        unsafe { &*self.header_ptr() }
    }

    #[inline]
    fn entries_base(&self) -> *mut T {
        self.header().entries_base.as_ptr().cast::<T>()
    }

    #[inline]
    fn control(&self, index: usize) -> Control {
        debug_assert!(index < self.capacity);
        // SAFETY: `index < capacity`, `metadata` has `capacity` live bytes.
        Control::from_raw(unsafe { *self.metadata.as_ptr().add(index) })
    }

    #[inline]
    fn set_control(&self, index: usize, value: Control) {
        debug_assert!(index < self.capacity);
        // SAFETY: same as `control`.
        unsafe { *self.metadata.as_ptr().add(index) = value.raw() };
    }

    #[inline]
    fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity);
        // SAFETY: `index < capacity`, `entries_base` has `capacity` slots.
        unsafe { self.entries_base().add(index) }
    }

    /// Reads the entry at a slot known to be used. Borrow lives as long as
    /// `self` (not `&self` directly — callers upgrade as needed).
    ///
    /// # Safety
    /// `index` must refer to a currently-used slot.
    #[inline]
    pub(crate) unsafe fn entry_at(&self, index: usize) -> &T {
        // SAFETY: forwarded from caller.
        unsafe { &*self.slot_ptr(index) }
    }

    /// # Safety
    /// `index` must refer to a currently-used slot, and the caller must
    /// not alias this reference.
    #[inline]
    pub(crate) unsafe fn entry_at_mut(&mut self, index: usize) -> &mut T {
        // SAFETY: forwarded from caller.
        unsafe { &mut *self.slot_ptr(index) }
    }

    /// Lookup (§4.4): walks the probe chain, stopping at the first empty
    /// slot. Never allocates, never mutates.
    pub(crate) fn find(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<usize> {
        if self.capacity == 0 {
            return None;
        }
        let fp = fingerprint_of(hash);
        for idx in ProbeSeq::new(hash, self.capacity) {
            let ctrl = self.control(idx);
            if !ctrl.is_occupied_or_tombstone() {
                return None;
            }
            if ctrl.is_used() && ctrl.fingerprint() == fp {
                // SAFETY: `idx` is a used slot just observed under `ctrl`.
                if eq(unsafe { self.entry_at(idx) }) {
                    return Some(idx);
                }
            }
            // Tombstone, or a used slot with a mismatched fingerprint:
            // the chain continues.
        }
        None
    }

    /// Walks the probe chain for an insertion: returns the existing slot
    /// on a match, otherwise the first usable vacant slot (first
    /// tombstone seen, or the terminating empty slot if none was seen).
    fn scan_for_insert(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> ScanOutcome {
        if self.capacity == 0 {
            return ScanOutcome::NeedsAllocation;
        }
        let fp = fingerprint_of(hash);
        let mut first_tombstone = None;
        for idx in ProbeSeq::new(hash, self.capacity) {
            let ctrl = self.control(idx);
            if ctrl.is_used() {
                if ctrl.fingerprint() == fp {
                    // SAFETY: `idx` is a used slot just observed under `ctrl`.
                    if eq(unsafe { self.entry_at(idx) }) {
                        return ScanOutcome::Found(idx);
                    }
                }
            } else if ctrl.is_tombstone() {
                first_tombstone.get_or_insert(idx);
            } else {
                return ScanOutcome::Vacant(first_tombstone.unwrap_or(idx));
            }
        }
        unreachable!("probe sequence exhausted without an empty slot: load invariant violated")
    }

    /// Finds the slot for an insert-shaped operation, growing first if
    /// necessary and permitted.
    ///
    /// `allow_grow = false` models the `*AssumeCapacity*` family (§4.5):
    /// the precondition is that the caller already reserved enough room,
    /// checked with `debug_assert!` rather than by allocating.
    ///
    /// Returns `(index, found)`; when `!found`, `index` names a slot whose
    /// control byte has *not* been written yet — the caller commits with
    /// [`RawTable::commit_insert`].
    pub(crate) fn find_or_prepare_insert<F>(
        &mut self,
        hash: u64,
        mut eq: impl FnMut(&T) -> bool,
        allow_grow: bool,
        hash_of: &F,
    ) -> Result<(usize, bool)>
    where
        F: Fn(&T) -> u64,
    {
        loop {
            match self.scan_for_insert(hash, &mut eq) {
                ScanOutcome::Found(idx) => return Ok((idx, true)),
                ScanOutcome::Vacant(idx) => {
                    if self.available == 0 {
                        if allow_grow {
                            self.reserve(1, hash_of)?;
                            continue;
                        }
                        debug_assert!(
                            self.available > 0,
                            "insert-assume-capacity exceeded reserved capacity"
                        );
                    }
                    return Ok((idx, false));
                }
                ScanOutcome::NeedsAllocation => {
                    if allow_grow {
                        self.reserve(1, hash_of)?;
                        continue;
                    }
                    // Writing through a dangling entries pointer would be
                    // real memory corruption, not the merely-unspecified
                    // UB the spec tolerates elsewhere for precondition
                    // violations — refuse outright, debug or release.
                    unreachable!(
                        "insert-assume-capacity called on a table with no backing allocation"
                    );
                }
            }
        }
    }

    /// Commits an insertion into a slot returned as `Vacant` by
    /// `find_or_prepare_insert`: writes the control byte, the value, and
    /// updates `size`/`available` (§4.3: empty-slot insertion spends one
    /// unit of `available`; tombstone-slot insertion does not).
    pub(crate) fn commit_insert(&mut self, index: usize, hash: u64, value: T) -> *mut T {
        let was_empty = self.control(index).is_empty();
        self.set_control(index, Control::used(fingerprint_of(hash)));
        let ptr = self.slot_ptr(index);
        // SAFETY: `index` was returned as a vacant slot; nothing else
        // refers into it.
        unsafe { ptr.write(value) };
        self.size += 1;
        if was_empty {
            self.available -= 1;
        }
        ptr
    }

    /// Removal (§4.4): tombstones the slot and moves the entry out.
    /// `size` decreases; `available` is unchanged (the slot stays counted
    /// against load until the next grow).
    pub(crate) fn remove(&mut self, hash: u64, eq: impl FnMut(&T) -> bool) -> Option<T> {
        let idx = self.find(hash, eq)?;
        Some(self.remove_at(idx))
    }

    /// Removes the entry at a slot already known to be used (e.g. by a
    /// prior `find`), skipping a redundant probe.
    ///
    /// # Safety
    /// `index` must refer to a currently-used slot.
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        debug_assert!(self.control(index).is_used());
        self.set_control(index, Control::TOMBSTONE);
        let ptr = self.slot_ptr(index);
        self.size -= 1;
        // SAFETY: `index` was a used slot; tombstoning it logically frees
        // the payload to the caller, so nothing else is allowed to touch
        // it afterward.
        unsafe { ptr.read() }
    }

    /// Ensures `additional` more insertions can happen without
    /// reallocating (§4.8 `reserve`, and the internal growth trigger of
    /// §4.3). A no-op if the current capacity already suffices.
    pub(crate) fn reserve<F: Fn(&T) -> u64>(
        &mut self,
        additional: usize,
        hash_of: &F,
    ) -> Result<()> {
        let target_load = self
            .load()
            .checked_add(additional)
            .ok_or(crate::error::CtrlMapError::CapacityOverflow)?;
        let needed = capacity_for_size(target_load, self.max_load_percentage)?.max(MIN_CAPACITY);
        if needed <= self.capacity {
            return Ok(());
        }
        self.resize_to(needed, hash_of)
    }

    /// Allocates a new block of `new_capacity` slots, rehashes every live
    /// entry into it (dropping tombstones for free), and releases the old
    /// block. Mirrors the single-allocation-replace discipline of §5
    /// ("grow allocates a new block, copies, then frees the old") applied
    /// to this spec's header-then-metadata-then-entries layout.
    fn resize_to<F: Fn(&T) -> u64>(&mut self, new_capacity: usize, hash_of: &F) -> Result<()> {
        debug_assert!(new_capacity.is_power_of_two());
        debug_assert!(new_capacity >= MIN_CAPACITY);

        let new_layout = layout_for_capacity::<T>(new_capacity)?;
        let block = try_alloc(&self.allocator, new_layout.alloc)?;

        // SAFETY: `block` is a fresh allocation sized by `new_layout`.
        unsafe {
            let metadata_ptr = block.as_ptr().add(new_layout.metadata_offset);
            metadata_ptr.write_bytes(0, new_capacity); // all Control::EMPTY
            let entries_ptr = block.as_ptr().add(new_layout.entries_offset);
            block.as_ptr().cast::<Header>().write(Header {
                entries_base: NonNull::new_unchecked(entries_ptr),
                capacity: new_capacity,
            });

            let old_capacity = self.capacity;
            let old_metadata = self.metadata;
            let old_entries_base = if old_capacity > 0 {
                Some(self.entries_base())
            } else {
                None
            };
            let old_header_and_layout = if old_capacity > 0 {
                Some((self.header_ptr(), layout_for_capacity::<T>(old_capacity)?))
            } else {
                None
            };

            self.metadata = NonNull::new_unchecked(metadata_ptr);
            self.capacity = new_capacity;
            self.available = max_load(new_capacity, self.max_load_percentage);
            self.size = 0;

            if let Some(old_entries_base) = old_entries_base {
                for i in 0..old_capacity {
                    let ctrl = Control::from_raw(*old_metadata.as_ptr().add(i));
                    if ctrl.is_used() {
                        let value = old_entries_base.add(i).read();
                        let h = hash_of(&value);
                        match self.scan_for_insert(h, |_| false) {
                            ScanOutcome::Vacant(target) => {
                                self.commit_insert(target, h, value);
                            }
                            _ => unreachable!(
                                "a freshly sized table must have room for every live entry \
                                 it was sized for, and rehashing cannot duplicate a key"
                            ),
                        }
                    }
                }
            }

            if let Some((old_header_ptr, old_layout)) = old_header_and_layout {
                self.allocator
                    .free(NonNull::new_unchecked(old_header_ptr.cast::<u8>()), old_layout.alloc);
            }
        }
        Ok(())
    }

    /// §4.8 `clearRetainingCapacity`: drops every live entry, resets
    /// metadata to empty, and restores `available` to a fresh table's
    /// budget, keeping the allocation.
    pub(crate) fn clear_retaining_capacity(&mut self) {
        if self.capacity == 0 {
            return;
        }
        self.drop_all_entries();
        // SAFETY: `metadata` has `capacity` live bytes.
        unsafe { self.metadata.as_ptr().write_bytes(0, self.capacity) };
        self.size = 0;
        self.available = max_load(self.capacity, self.max_load_percentage);
    }

    /// §4.8 `clearAndFree`: releases the allocation, returning the table
    /// to its zero state.
    pub(crate) fn clear_and_free(&mut self) {
        if self.capacity == 0 {
            return;
        }
        self.drop_all_entries();
        let layout = layout_for_capacity::<T>(self.capacity)
            .expect("layout for an already-allocated capacity cannot overflow");
        let header_ptr = self.header_ptr();
        // SAFETY: this is the sole allocation the table owns.
        unsafe {
            self.allocator
                .free(NonNull::new_unchecked(header_ptr.cast::<u8>()), layout.alloc);
        }
        self.metadata = NonNull::dangling();
        self.capacity = 0;
        self.size = 0;
        self.available = 0;
    }

    fn drop_all_entries(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }
        for i in 0..self.capacity {
            if self.control(i).is_used() {
                // SAFETY: `i` is a used slot; this is the one and only
                // drop of its payload.
                unsafe { self.slot_ptr(i).drop_in_place() };
            }
        }
    }

    pub(crate) fn iter(&self) -> RawIter<'_, T> {
        let entries = if self.capacity == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: non-null by construction in `resize_to`.
            unsafe { NonNull::new_unchecked(self.entries_base()) }
        };
        RawIter::new(self.metadata, entries, self.capacity)
    }
}

impl<T, A: RawAllocator> Drop for RawTable<T, A> {
    fn drop(&mut self) {
        self.clear_and_free();
    }
}

// SAFETY: a `RawTable<T, A>` owns its `T`s and its `A` outright; it is
// `Send`/`Sync` exactly when those would be, same as the teacher's
// `unsafe impl<T> Send for RawTable<T>` / `Sync` in `table.rs`. The spec
// disclaims any *internal synchronization* (§5's Non-goal), not these
// auto traits, which only describe safe transfer/sharing of ownership.
unsafe impl<T: Send, A: RawAllocator + Send> Send for RawTable<T, A> {}
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for RawTable<T, A> {}
