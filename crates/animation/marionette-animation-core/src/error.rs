use thiserror::Error;

use crate::motion::MotionPriority;

/// Malformed motion or expression data, reported by `validate`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    NegativeTime { field: &'static str, value: f32 },
    #[error("curve '{curve}' has a key at segment {segment} that goes back in time")]
    UnorderedKeys { curve: String, segment: usize },
}

/// Why a play request was turned down. The queue is left untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayError {
    #[error("index {index} is out of range for a library of {len}")]
    InvalidIndex { index: usize, len: usize },
    #[error("priority {requested:?} rejected (current {current:?}, reserved {reserved:?})")]
    PriorityRejected {
        requested: MotionPriority,
        current: MotionPriority,
        reserved: MotionPriority,
    },
    #[error("offset must be a finite, non-negative number of seconds (got {0})")]
    NegativeOffset(f32),
}
