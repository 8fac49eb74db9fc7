//! Test helpers shared by the `frameshed` integration tests.
//!
//! Provides a global log-capture fixture, renderers that record what they
//! were asked to do, and assertion macros for queue operations.
//!
//! ```rust
//! use frameshed::{FrameQueue, QueueItem};
//! use frameshed_testing::{RecordingRenderer, enqueue_expect};
//!
//! let (_queue, producer, _config) = FrameQueue::<QueueItem>::builder()
//!     .capacity(4)
//!     .build()
//!     .expect("failed to build FrameQueue");
//! enqueue_expect!(producer, QueueItem::new(1));
//! let renderer = RecordingRenderer::default();
//! assert!(renderer.rendered().is_empty());
//! ```

pub mod logging;
pub mod macros;
pub mod metrics;
pub mod renderer;

pub use logging::{LoggerHandle, logger};
pub use metrics::{counter_values, debugging_recorder_setup};
pub use renderer::{FailingRenderer, RecordingRenderer, image_item, preload};
