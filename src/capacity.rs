//! Load and growth bookkeeping (§4.3 of the design notes).
//!
//! Generalizes the teacher's `capacity_to_buckets`/`bucket_mask_to_capacity`
//! pair (`src/index/hash/table.rs`), which hard-coded an 87.5% load factor
//! taken from the group width. `MaxLoadPercentage` here is a type-level
//! `const usize` instead (see `crate::map`), so these helpers take it as a
//! parameter and work for any value in `(0, 100)`.

use crate::error::{CtrlMapError, Result};

/// Smallest capacity a freshly allocated table will ever take.
pub const MIN_CAPACITY: usize = 8;

/// `true` iff `percentage` is a legal `MaxLoadPercentage` (§4.3: "An
/// implementation must reject values <=0 or >=100 at construction").
#[inline]
#[must_use]
pub const fn is_valid_max_load_percentage(percentage: usize) -> bool {
    percentage > 0 && percentage < 100
}

/// `floor(capacity * max_load_percentage / 100)`: the maximum number of
/// occupied-or-tombstoned slots a table of this capacity may carry.
#[inline]
#[must_use]
pub fn max_load(capacity: usize, max_load_percentage: usize) -> usize {
    capacity * max_load_percentage / 100
}

/// Smallest power of two capacity that can hold `n` live entries while
/// staying strictly under `max_load_percentage` load.
///
/// Mirrors `capacity_to_buckets` in the teacher, generalized from its fixed
/// 7/8 ratio to an arbitrary percentage, and returning `CapacityOverflow`
/// instead of `None` (the teacher's `CollectionAllocErr::CapacityOverflow`,
/// renamed here since `CollectionAllocErr` doesn't survive the allocator
/// trait rewrite — see `raw::alloc`).
#[inline]
pub fn capacity_for_size(n: usize, max_load_percentage: usize) -> Result<usize> {
    debug_assert!(is_valid_max_load_percentage(max_load_percentage));
    let scaled = n
        .checked_mul(100)
        .ok_or(CtrlMapError::CapacityOverflow)?
        .div_ceil(max_load_percentage);
    let needed = scaled.checked_add(1).ok_or(CtrlMapError::CapacityOverflow)?;
    Ok(needed.next_power_of_two())
}
