use thiserror::Error;

/// Errors surfaced by the fallible (`try_*`) half of the public API.
///
/// Everything else the map can get wrong is a precondition violation and is
/// asserted on the hot path rather than returned (debug builds abort,
/// release builds trust the caller).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CtrlMapError {
    #[error("allocator failed to satisfy a request of {size} bytes (align {align})")]
    AllocationFailed { size: usize, align: usize },
    #[error("requested capacity overflows usize")]
    CapacityOverflow,
}

pub type Result<T> = std::result::Result<T, CtrlMapError>;
