//! Single-pass table iteration (§4.7): a linear walk over the metadata
//! array that yields every used slot once, in storage order.
//!
//! Mirrors the teacher's `RawIter`/`RawIterRange` (`src/index/hash/table.rs`)
//! shape — a base pointer plus a remaining-count plus a current index,
//! advanced with a `while` loop skipping non-full slots — but walks one
//! control byte at a time instead of one SIMD group at a time, and (per
//! §4.7: "An iterator is single-pass; restarting it or calling it again
//! after completion is unspecified, not an error") carries no means to
//! reset or restart itself.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::raw::control::Control;

/// Borrows a table for the duration of the walk. Constructed by
/// `RawTable::iter`; never constructed directly by callers.
pub(crate) struct RawIter<'a, T> {
    metadata: NonNull<u8>,
    entries: NonNull<T>,
    capacity: usize,
    index: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> RawIter<'a, T> {
    #[inline]
    pub(crate) fn new(metadata: NonNull<u8>, entries: NonNull<T>, capacity: usize) -> Self {
        RawIter {
            metadata,
            entries,
            capacity,
            index: 0,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for RawIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while self.index < self.capacity {
            let idx = self.index;
            self.index += 1;
            // SAFETY: `idx < capacity`, `metadata` has `capacity` live bytes.
            let ctrl = Control::from_raw(unsafe { *self.metadata.as_ptr().add(idx) });
            if ctrl.is_used() {
                // SAFETY: `idx < capacity`, `entries` has `capacity` slots,
                // and `idx` was just observed used, so this slot holds a
                // live, initialized `T` borrowed for `'a` (the table's
                // `&self` lifetime, per `RawTable::iter`).
                return Some(unsafe { &*self.entries.as_ptr().add(idx) });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.capacity - self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::alloc::Global;
    use crate::raw::table::RawTable;

    #[test]
    fn visits_only_used_slots() {
        let mut table: RawTable<(u64, u64)> = RawTable::new(Global, 80);
        for i in 0..10u64 {
            let h = fxhash::hash64(&i);
            let (idx, _) = table
                .find_or_prepare_insert(h, |e| e.0 == i, true, &|e: &(u64, u64)| {
                    fxhash::hash64(&e.0)
                })
                .unwrap();
            table.commit_insert(idx, h, (i, i * 10));
        }
        let h5 = fxhash::hash64(&5u64);
        table.remove(h5, |e| e.0 == 5);

        let mut seen: Vec<u64> = table.iter().map(|e| e.0).collect();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..10u64).filter(|&i| i != 5).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn empty_table_iterates_to_nothing() {
        let table: RawTable<(u64, u64)> = RawTable::new(Global, 80);
        assert_eq!(table.iter().count(), 0);
    }
}
