//! Load-shedding consumer loop.
//!
//! [`FrameConsumer`] drains a [`FrameQueue`] on a dedicated thread. After
//! each dequeue it looks at how many items are still waiting: below the
//! shedding threshold the item is rendered, at or above it the item is
//! discarded without any decode work. The item has already left the queue
//! either way, so shedding costs nothing and keeps the backlog draining at
//! full speed. Items are handled strictly in arrival order.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    metrics,
    queue::{ConsumerConfig, Frame, FrameQueue},
    render::FrameRenderer,
};

/// What happened during one [`FrameConsumer::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing arrived within the poll interval.
    Idle,
    /// The renderer accepted the item.
    Rendered {
        sequence_id: Option<u64>,
        occupancy: usize,
    },
    /// The backlog was at or above the threshold; rendering was skipped.
    Shed {
        sequence_id: Option<u64>,
        occupancy: usize,
    },
    /// The item carried no payload to render.
    SkippedNoPayload {
        sequence_id: Option<u64>,
        occupancy: usize,
    },
    /// The renderer reported an error.
    RenderFailed {
        sequence_id: Option<u64>,
        occupancy: usize,
    },
}

/// Running totals of [`StepOutcome`]s, returned by [`FrameConsumer::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub rendered: u64,
    pub shed: u64,
    pub skipped_no_payload: u64,
    pub render_failed: u64,
}

impl ConsumerStats {
    /// Add one outcome to the totals.
    pub fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Idle => {}
            StepOutcome::Rendered { .. } => self.rendered += 1,
            StepOutcome::Shed { .. } => self.shed += 1,
            StepOutcome::SkippedNoPayload { .. } => self.skipped_no_payload += 1,
            StepOutcome::RenderFailed { .. } => self.render_failed += 1,
        }
    }

    /// Number of items taken off the queue.
    #[must_use]
    pub fn dequeued(&self) -> u64 {
        self.rendered + self.shed + self.skipped_no_payload + self.render_failed
    }
}

/// Consumer end of the pipeline: owns the queue and applies the shedding
/// policy.
pub struct FrameConsumer<T> {
    queue: FrameQueue<T>,
    config: ConsumerConfig,
}

impl<T: Frame> FrameConsumer<T> {
    /// Pair a queue with the settings produced by its builder.
    #[must_use]
    pub fn new(queue: FrameQueue<T>, config: ConsumerConfig) -> Self { Self { queue, config } }

    /// The queue being drained.
    pub fn queue(&self) -> &FrameQueue<T> { &self.queue }

    /// The active consumer settings.
    pub fn config(&self) -> ConsumerConfig { self.config }

    /// Wait up to the poll interval for one item and handle it.
    pub fn step<R>(&self, renderer: &mut R) -> StepOutcome
    where
        R: FrameRenderer<T> + ?Sized,
    {
        match self.queue.dequeue_timeout(self.config.poll_interval) {
            Some(item) => self.handle(&item, renderer),
            None => StepOutcome::Idle,
        }
    }

    /// Apply the shedding decision to an item that was just dequeued.
    ///
    /// Occupancy is read after the removal, so it counts only the items still
    /// waiting behind this one.
    pub fn handle<R>(&self, item: &T, renderer: &mut R) -> StepOutcome
    where
        R: FrameRenderer<T> + ?Sized,
    {
        let occupancy = self.queue.occupancy();
        let sequence_id = item.sequence_id();

        if occupancy >= self.config.shedding_threshold {
            metrics::inc_shed();
            info!(?sequence_id, occupancy, "skip process");
            return StepOutcome::Shed {
                sequence_id,
                occupancy,
            };
        }

        debug!(?sequence_id, occupancy, "process message");
        let Some(payload) = item.payload() else {
            debug!(?sequence_id, "no frame payload; nothing to render");
            return StepOutcome::SkippedNoPayload {
                sequence_id,
                occupancy,
            };
        };

        match renderer.render(item, payload) {
            Ok(()) => {
                metrics::inc_rendered();
                StepOutcome::Rendered {
                    sequence_id,
                    occupancy,
                }
            }
            Err(e) => {
                metrics::inc_render_errors();
                warn!(?sequence_id, error = %e, "render failed; frame skipped");
                StepOutcome::RenderFailed {
                    sequence_id,
                    occupancy,
                }
            }
        }
    }

    /// Drain the queue until `shutdown` is cancelled or the queue is closed
    /// and empty.
    ///
    /// Cancellation is observed within one poll interval. Items still queued
    /// at that point are left behind.
    pub fn run<R>(&self, renderer: &mut R, shutdown: &CancellationToken) -> ConsumerStats
    where
        R: FrameRenderer<T> + ?Sized,
    {
        let mut stats = ConsumerStats::default();
        info!(
            capacity = self.queue.capacity(),
            threshold = self.config.shedding_threshold,
            "frame consumer started"
        );
        while !shutdown.is_cancelled() {
            if self.queue.is_closed() && self.queue.is_empty() {
                break;
            }
            stats.record(self.step(renderer));
        }
        info!(
            rendered = stats.rendered,
            shed = stats.shed,
            skipped = stats.skipped_no_payload,
            failed = stats.render_failed,
            "frame consumer stopped"
        );
        stats
    }
}
