//! Single-allocation layout: `header ‖ metadata[capacity] ‖ padding ‖
//! entries[capacity]` (§4.1).
//!
//! Generalizes the teacher's `calculate_layout`/`new_uninitialized`
//! (`src/index/hash/table.rs`), which laid out `data[buckets] ‖
//! ctrl[buckets + Group::WIDTH]` with the control bytes *after* the data
//! and no separate header — the teacher recovers its base pointer from
//! `self.ctrl` alone because it never needs to recover a "start of
//! allocation" pointer (its `free_buckets` recomputes the layout from
//! `self.buckets()` instead of walking backward). This spec requires an
//! explicit header object living immediately before the metadata region,
//! recovered by stepping backward exactly `size_of::<Header>()` bytes
//! (§4.1, §9 "Interior pointer to the middle of one allocation"), so the
//! header's fields are computed and cached here rather than recomputed
//! via offset math at every access.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::{CtrlMapError, Result};

/// Lives immediately before the metadata array in the single backing
/// allocation. Caches the two quantities that would otherwise need
/// pointer arithmetic against the allocation base on every access.
#[repr(C)]
pub(crate) struct Header {
    /// Pointer to `entries[0]`, within the same allocation.
    pub(crate) entries_base: NonNull<u8>,
    pub(crate) capacity: usize,
}

/// Byte layout of one table allocation for a given entry type and capacity.
pub(crate) struct TableLayout {
    pub(crate) alloc: Layout,
    /// Offset of `metadata[0]` from the allocation base. Always exactly
    /// `size_of::<Header>()` since the metadata array's alignment is 1
    /// (asserted in `debug_layout_invariants`), so no padding is inserted
    /// between the header and the metadata region.
    pub(crate) metadata_offset: usize,
    /// Offset of `entries[0]` from the allocation base.
    pub(crate) entries_offset: usize,
}

/// Metadata bytes must be exactly one byte, alignment one — §4.1: "An
/// implementation must assert that the metadata byte's size and alignment
/// are each exactly 1."
#[inline]
pub(crate) fn assert_metadata_byte_layout() {
    debug_assert_eq!(std::mem::size_of::<u8>(), 1);
    debug_assert_eq!(std::mem::align_of::<u8>(), 1);
}

/// Computes the layout for a table entry type `T` holding up to `capacity`
/// slots. `capacity` must already be a power of two (or zero, which callers
/// must special-case before allocating at all — see `RawTable::new`).
pub(crate) fn layout_for_capacity<T>(capacity: usize) -> Result<TableLayout> {
    assert_metadata_byte_layout();
    debug_assert!(capacity.is_power_of_two());

    let header = Layout::new::<Header>();
    let metadata = Layout::array::<u8>(capacity).map_err(|_| CtrlMapError::CapacityOverflow)?;
    let (header_and_metadata, metadata_offset) = header
        .extend(metadata)
        .map_err(|_| CtrlMapError::CapacityOverflow)?;
    debug_assert_eq!(metadata_offset, header.size());

    let entries = Layout::array::<T>(capacity).map_err(|_| CtrlMapError::CapacityOverflow)?;
    let (full, entries_offset) = header_and_metadata
        .extend(entries)
        .map_err(|_| CtrlMapError::CapacityOverflow)?;

    Ok(TableLayout {
        alloc: full.pad_to_align(),
        metadata_offset,
        entries_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(align(8))]
    struct Wide([u8; 24]);

    #[test]
    fn metadata_immediately_follows_header() {
        let layout = layout_for_capacity::<u64>(16).unwrap();
        assert_eq!(layout.metadata_offset, std::mem::size_of::<Header>());
    }

    #[test]
    fn entries_are_aligned_for_wide_entries() {
        let layout = layout_for_capacity::<Wide>(16).unwrap();
        assert_eq!(layout.entries_offset % std::mem::align_of::<Wide>(), 0);
        assert!(layout.entries_offset >= layout.metadata_offset + 16);
    }

    #[test]
    fn huge_capacity_reports_overflow_instead_of_panicking() {
        assert!(layout_for_capacity::<u64>(usize::MAX / 2).is_err());
    }
}
