//! Metric helpers for `frameshed`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking frames accepted by the queue.
pub const FRAMES_ENQUEUED: &str = "frameshed_frames_enqueued_total";
/// Name of the counter tracking frames rejected because the queue was full.
pub const FRAMES_DROPPED: &str = "frameshed_frames_dropped_total";
/// Name of the counter tracking frames dequeued but not rendered.
pub const FRAMES_SHED: &str = "frameshed_frames_shed_total";
/// Name of the counter tracking frames handed to the renderer successfully.
pub const FRAMES_RENDERED: &str = "frameshed_frames_rendered_total";
/// Name of the counter tracking renderer failures.
pub const RENDER_ERRORS: &str = "frameshed_render_errors_total";

/// Record a frame accepted by the queue.
pub fn inc_enqueued() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_ENQUEUED).increment(1);
}

/// Record a frame dropped at enqueue time.
pub fn inc_dropped() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DROPPED).increment(1);
}

/// Record a frame skipped by the shedding policy.
pub fn inc_shed() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_SHED).increment(1);
}

/// Record a successfully rendered frame.
pub fn inc_rendered() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_RENDERED).increment(1);
}

/// Record a renderer failure.
pub fn inc_render_errors() {
    #[cfg(feature = "metrics")]
    counter!(RENDER_ERRORS).increment(1);
}
