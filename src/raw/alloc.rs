//! The externally supplied allocator (§6): "an object exposing at minimum
//! `alloc(size, align) -> ptr | fail`, `free(ptr, size, align)`, and
//! optionally `realloc`."
//!
//! The teacher gates an unstable `core::alloc::Allocator` behind a
//! `nightly` feature and falls back to raw `std::alloc::{alloc, dealloc}`
//! calls otherwise (`src/index/hash/table.rs::new_uninitialized`/
//! `free_buckets`). Since the spec's allocator is a plain interface the
//! caller supplies — not specifically the unstable standard trait — this
//! crate defines its own stable trait and always takes the teacher's
//! non-nightly path underneath it.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::{CtrlMapError, Result};

/// A source of raw memory for one table's single backing allocation.
///
/// # Safety
/// Implementors must return memory that is valid for `layout` (correctly
/// sized and aligned) or `None`, and must treat `free` as releasing
/// exactly the block most recently returned by a matching `alloc` call of
/// the same layout.
pub unsafe trait RawAllocator {
    /// Allocates a block matching `layout`, or returns `None` on failure.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases a block previously returned by `alloc(layout)`.
    ///
    /// # Safety
    /// `ptr` must have been returned by `self.alloc(layout)` (or
    /// `self.grow`/`self.shrink` with the same trailing layout) and not
    /// already freed.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);

    /// Grows a previously allocated block from `old_layout` to
    /// `new_layout`, copying the original contents. The default
    /// implementation allocates, copies, and frees, matching the
    /// teacher's grow-by-realloc discipline (§5: "grow allocates a new
    /// block, copies, then frees the old").
    ///
    /// # Safety
    /// `ptr` must have been returned by `self.alloc(old_layout)`, and
    /// `new_layout.size() >= old_layout.size()`.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        debug_assert!(new_layout.size() >= old_layout.size());
        let new_ptr = self.alloc(new_layout)?;
        unsafe {
            new_ptr
                .as_ptr()
                .copy_from_nonoverlapping(ptr.as_ptr(), old_layout.size());
            self.free(ptr, old_layout);
        }
        Some(new_ptr)
    }
}

/// Turns an allocation failure into the crate's public error type.
#[inline]
pub(crate) fn alloc_failed(layout: Layout) -> CtrlMapError {
    CtrlMapError::AllocationFailed {
        size: layout.size(),
        align: layout.align(),
    }
}

#[inline]
pub(crate) fn try_alloc<A: RawAllocator>(allocator: &A, layout: Layout) -> Result<NonNull<u8>> {
    allocator.alloc(layout).ok_or_else(|| alloc_failed(layout))
}

/// The process-global heap, reached through [`std::alloc`] exactly as the
/// teacher's non-nightly path does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

// SAFETY: `std::alloc::alloc`/`dealloc` satisfy the contract for any
// nonzero layout, which is all a hash table's metadata+entries block ever
// is (capacity is always >= MIN_CAPACITY once allocated).
unsafe impl RawAllocator for Global {
    #[inline]
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layout has nonzero size, checked above.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr)
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract on `RawAllocator::free`.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_round_trips_a_block() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let ptr = Global.alloc(layout).expect("allocation should succeed");
        unsafe {
            ptr.as_ptr().write_bytes(0xAA, layout.size());
            Global.free(ptr, layout);
        }
    }

    #[test]
    fn global_grow_preserves_contents() {
        let old_layout = Layout::from_size_align(8, 8).unwrap();
        let new_layout = Layout::from_size_align(64, 8).unwrap();
        let ptr = Global.alloc(old_layout).unwrap();
        unsafe {
            ptr.as_ptr().copy_from(b"deadbeef".as_ptr(), 8);
            let grown = Global.grow(ptr, old_layout, new_layout).unwrap();
            let mut buf = [0u8; 8];
            grown.as_ptr().copy_to(buf.as_mut_ptr(), 8);
            assert_eq!(&buf, b"deadbeef");
            Global.free(grown, new_layout);
        }
    }
}
