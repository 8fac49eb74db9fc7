#![doc(html_root_url = "https://docs.rs/frameshed/latest")]
//! Public API for the `frameshed` library.
//!
//! This crate decouples a message-ingestion context from a CPU-heavy
//! decode/render worker with a bounded frame queue, producer backpressure and
//! a load-shedding consumer loop.

pub mod consumer;
pub mod item;
pub mod metrics;
pub mod queue;
pub mod render;

pub use consumer::{ConsumerStats, FrameConsumer, StepOutcome};
pub use item::{ItemError, QueueItem};
pub use queue::{
    Backpressure,
    ConsumerConfig,
    EnqueueError,
    Frame,
    FrameQueue,
    FrameQueueBuilder,
    ProducerHandle,
    QueueConfigError,
    ShedThreshold,
};
pub use render::{FrameRenderer, RenderError};
