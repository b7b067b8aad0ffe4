use thiserror::Error;

/// Precondition violations inside [`crate::fixed_vector::FixedVector`].
///
/// These are programmer errors: every call site in this crate is expected to
/// maintain the size/capacity invariants itself, so a violation here means a
/// bug in the surrounding `Node`/`Tree` logic, not bad caller input. Treated
/// as fatal per spec: callers should let this propagate and abort rather than
/// attempt recovery.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FixedVectorError {
    #[error("push would exceed capacity {capacity} (size was {size})")]
    CapacityExceeded { size: usize, capacity: usize },
    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },
    #[error("insert_at index {index} out of bounds for size {size} (capacity {capacity})")]
    InsertOutOfBounds {
        index: usize,
        size: usize,
        capacity: usize,
    },
    #[error("truncate target {target} exceeds capacity {capacity}")]
    TruncateOutOfBounds { target: usize, capacity: usize },
}

/// The one error surfaced across the circular log's public boundary (spec §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CircularLogError {
    #[error(
        "record of {required} bytes (header + key + value) does not fit in a log of {capacity} bytes"
    )]
    OutOfCapacity { required: usize, capacity: usize },
}
