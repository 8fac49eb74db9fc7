//! Cloneable handle used by ingestion code to feed a [`FrameQueue`].
//!
//! [`FrameQueue`]: super::FrameQueue

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Backpressure, EnqueueError, Frame, Shared};
use crate::metrics;

/// Producer end of a bounded frame queue.
///
/// The handle shares the buffer with the consumer through an [`Arc`]. The
/// buffer is designed for a single producer context such as a broker
/// callback; cloning the handle is cheap but concurrent producers give up
/// the arrival-order guarantee between them.
pub struct ProducerHandle<T>(Arc<Shared<T>>);

impl<T> Clone for ProducerHandle<T> {
    fn clone(&self) -> Self { Self(Arc::clone(&self.0)) }
}

impl<T: Send + 'static> ProducerHandle<T> {
    pub(crate) fn from_arc(arc: Arc<Shared<T>>) -> Self { Self(arc) }

    /// Store `item` if a slot is free, without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Full`] carrying the item back when every
    /// usable slot is taken; the queue is left unchanged. Returns
    /// [`EnqueueError::Closed`] once the queue has been closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use frameshed::queue::{EnqueueError, FrameQueue};
    ///
    /// let (_queue, producer, _config) = FrameQueue::<u8>::builder()
    ///     .capacity(2)
    ///     .build()
    ///     .expect("failed to build FrameQueue");
    /// producer.try_enqueue(1).expect("enqueue failed");
    /// assert_eq!(producer.try_enqueue(2), Err(EnqueueError::Full(2)));
    /// ```
    pub fn try_enqueue(&self, item: T) -> Result<(), EnqueueError<T>> { self.0.try_push(item) }

    /// Enqueue `item` following the configured [`Backpressure`] policy.
    ///
    /// With [`Backpressure::DropOnFull`] a full queue rejects the item at once
    /// and a warning is logged. With [`Backpressure::RetryOnFull`] the call
    /// blocks, waking at least every `retry_interval`, until a slot frees up
    /// or the queue is closed.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Full`] under the drop policy and
    /// [`EnqueueError::Closed`] if the queue is closed before the item fits.
    pub fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>>
    where
        T: Frame,
    {
        let sequence_id = item.sequence_id();
        let result = match self.0.backpressure() {
            Backpressure::DropOnFull => self.0.try_push(item),
            Backpressure::RetryOnFull { retry_interval } => {
                let mut pending = item;
                loop {
                    match self.0.push_timeout(pending, retry_interval) {
                        Err(EnqueueError::Full(returned)) => {
                            info!(?sequence_id, "frame queue full; waiting to enqueue");
                            pending = returned;
                        }
                        other => break other,
                    }
                }
            }
        };
        match &result {
            Ok(()) => {
                metrics::inc_enqueued();
                debug!(?sequence_id, "frame enqueued");
            }
            Err(EnqueueError::Full(_)) => {
                metrics::inc_dropped();
                warn!(?sequence_id, "frame queue full; dropping frame");
            }
            Err(EnqueueError::Closed(_)) => {
                debug!(?sequence_id, "frame queue closed; frame rejected");
            }
        }
        result
    }

    /// Whether no items are queued.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Number of queued items.
    pub fn occupancy(&self) -> usize { self.0.occupancy() }

    /// Slot count chosen at construction, including the gap slot.
    pub fn capacity(&self) -> usize { self.0.capacity() }

    /// Whether the queue has been closed by either side.
    pub fn is_closed(&self) -> bool { self.0.is_closed() }

    /// Signal that no more items will be produced.
    ///
    /// The consumer still drains whatever is queued and then stops.
    pub fn close(&self) { self.0.close(); }

    /// The policy applied by [`Self::enqueue`].
    pub fn backpressure(&self) -> Backpressure { self.0.backpressure() }
}
