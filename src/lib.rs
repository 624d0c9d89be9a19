//! A generic `K -> V` associative container on open addressing with linear
//! probing and a single metadata byte per slot (§3, §4 of the design
//! notes in this repository).
//!
//! Three ideas carry the cache behavior:
//!
//! - **One allocation.** `header ‖ metadata[capacity] ‖ padding ‖
//!   entries[capacity]` lives in a single block ([`raw::layout`]).
//! - **A one-byte filter per slot.** Before comparing keys, a probe
//!   compares a single metadata byte carrying a 6-bit fingerprint
//!   ([`raw::control`]), so a mismatch never touches the entries array.
//! - **Tombstones, not backshifting.** Removal marks a slot rather than
//!   repairing the chain behind it; tombstones are discarded for free the
//!   next time the table grows ([`raw::table`]).
//!
//! [`map::CtrlMap`] is the public surface; [`raw`] is the unsafe engine
//! underneath it and is not exported.

mod capacity;
mod entry;
mod error;
mod map;
mod raw;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use error::{CtrlMapError, Result};
pub use map::{CtrlMap, DefaultHashBuilder, Iter};
pub use raw::{Global, RawAllocator};
