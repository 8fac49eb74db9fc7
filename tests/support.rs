#![cfg_attr(loom, allow(missing_docs))]
#![cfg(not(loom))]
//! Shared fixtures for integration tests.

use std::time::Duration;

use frameshed::{FrameQueue, FrameQueueBuilder, QueueItem};

/// Returns a builder with a short poll interval for reuse across tests.
#[must_use]
pub fn builder() -> FrameQueueBuilder<QueueItem> {
    FrameQueue::<QueueItem>::builder().poll_interval(Duration::from_millis(5))
}
