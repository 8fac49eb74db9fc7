//! Builder for configuring frame queues.

use std::{marker::PhantomData, sync::Arc, time::Duration};

use tracing::warn;

use super::{
    Backpressure,
    ConsumerConfig,
    DEFAULT_CAPACITY,
    DEFAULT_POLL_INTERVAL,
    FrameQueue,
    MAX_QUEUE_CAPACITY,
    MIN_QUEUE_CAPACITY,
    ProducerHandle,
    QueueConfigError,
    ShedThreshold,
    Shared,
};

/// Builder for [`FrameQueue`].
///
/// Collects the slot count, producer backpressure policy, consumer wait
/// interval and shedding threshold before constructing the queue, its
/// [`ProducerHandle`] and the [`ConsumerConfig`] for the render loop.
/// Defaults: 50 slots, [`Backpressure::DropOnFull`], a 10 ms poll interval
/// and [`ShedThreshold::HalfCapacity`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use frameshed::queue::{Backpressure, FrameQueue, ShedThreshold};
///
/// let (_queue, _producer, config) = FrameQueue::<u8>::builder()
///     .capacity(30)
///     .backpressure(Backpressure::retry())
///     .shedding_threshold(ShedThreshold::Fixed(5))
///     .poll_interval(Duration::from_millis(1))
///     .build()
///     .expect("failed to build FrameQueue");
/// assert_eq!(config.shedding_threshold, 5);
/// ```
#[derive(Debug)]
pub struct FrameQueueBuilder<T> {
    capacity: usize,
    backpressure: Backpressure,
    threshold: ShedThreshold,
    poll_interval: Duration,
    _item: PhantomData<fn() -> T>,
}

impl<T> Default for FrameQueueBuilder<T> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            backpressure: Backpressure::default(),
            threshold: ShedThreshold::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            _item: PhantomData,
        }
    }
}

impl<T: Send + 'static> FrameQueueBuilder<T> {
    /// Set the slot count. One slot is always kept free, so the queue holds
    /// at most `capacity - 1` items.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Choose what [`ProducerHandle::enqueue`] does when the queue is full.
    #[must_use]
    pub fn backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Set the backlog size at which the consumer skips rendering.
    #[must_use]
    pub fn shedding_threshold(mut self, threshold: ShedThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the longest single consumer wait before the stop signal is
    /// checked again.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn validate(&self) -> Result<usize, QueueConfigError> {
        if !(MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&self.capacity) {
            return Err(QueueConfigError::InvalidCapacity(self.capacity));
        }
        if let ShedThreshold::Fixed(0) = self.threshold {
            return Err(QueueConfigError::InvalidThreshold(0));
        }
        if self.poll_interval.is_zero() {
            return Err(QueueConfigError::InvalidPollInterval(self.poll_interval));
        }
        if let Backpressure::RetryOnFull { retry_interval } = self.backpressure {
            if retry_interval.is_zero() {
                return Err(QueueConfigError::InvalidRetryInterval(retry_interval));
            }
        }
        let threshold = self.threshold.resolve(self.capacity);
        // at most capacity - 2 items remain after a dequeue
        if threshold >= self.capacity - 1 {
            warn!(
                threshold,
                usable = self.capacity - 1,
                "shedding threshold can never be reached; no frames will be shed"
            );
        }
        Ok(threshold)
    }

    /// Build the queue, its producer handle and the consumer settings.
    ///
    /// # Errors
    ///
    /// Returns [`QueueConfigError::InvalidCapacity`] if the slot count is
    /// outside `2..=`[`MAX_QUEUE_CAPACITY`],
    /// [`QueueConfigError::InvalidThreshold`] for a fixed threshold of zero and
    /// [`QueueConfigError::InvalidPollInterval`] or
    /// [`QueueConfigError::InvalidRetryInterval`] for zero intervals.
    pub fn build(self) -> Result<(FrameQueue<T>, ProducerHandle<T>, ConsumerConfig), QueueConfigError> {
        let shedding_threshold = self.validate()?;
        let shared = Arc::new(Shared::new(self.capacity, self.backpressure));
        let config = ConsumerConfig {
            shedding_threshold,
            poll_interval: self.poll_interval,
        };
        Ok((
            FrameQueue::from_shared(Arc::clone(&shared)),
            ProducerHandle::from_arc(shared),
            config,
        ))
    }
}
