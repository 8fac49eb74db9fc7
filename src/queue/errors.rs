//! Error types for frame queue operations and configuration.

use std::time::Duration;

use thiserror::Error;

use super::{MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};

/// Errors that can occur when enqueuing an item.
///
/// The rejected item is handed back so the caller can log, retry or drop it.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnqueueError<T> {
    /// Every usable slot was occupied.
    #[error("frame queue full")]
    Full(T),
    /// The queue has been closed and accepts no further items.
    #[error("frame queue closed")]
    Closed(T),
}

impl<T> EnqueueError<T> {
    /// Recover the rejected item.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }

    /// Whether the rejection was caused by a full buffer.
    #[must_use]
    pub fn is_full(&self) -> bool { matches!(self, Self::Full(_)) }
}

/// Errors returned when building a frame queue.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueConfigError {
    /// The slot count was outside the supported range.
    #[error(
        "invalid capacity {0}; must be between {min} and {max}",
        min = MIN_QUEUE_CAPACITY,
        max = MAX_QUEUE_CAPACITY
    )]
    InvalidCapacity(usize),
    /// A fixed shedding threshold of zero would shed every item.
    #[error("invalid shedding threshold {0}; must be >= 1")]
    InvalidThreshold(usize),
    /// The consumer wait interval was zero.
    #[error("invalid poll interval {0:?}; must be non-zero")]
    InvalidPollInterval(Duration),
    /// The retry-on-full interval was zero.
    #[error("invalid retry interval {0:?}; must be non-zero")]
    InvalidRetryInterval(Duration),
}
