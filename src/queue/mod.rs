//! Bounded frame queue shared between an ingestion context and a render
//! worker.
//!
//! [`FrameQueue`] is the consumer end and owns the buffer; producers enqueue
//! through a cloneable [`ProducerHandle`]. Items leave the queue in exactly
//! the order they entered it. The buffer never grows: a full queue either
//! rejects new items or makes the producer wait, depending on the configured
//! [`Backpressure`].
//!
//! One mutex guards the ring indices and slots. It is held only while those
//! change, never across decode or render work. Two condition variables let
//! the consumer sleep until data arrives and let a retrying producer sleep
//! until space is freed.

#[cfg(not(loom))]
use std::sync::{Condvar, Mutex, MutexGuard};
use std::{
    sync::{Arc, PoisonError},
    time::Duration,
};

#[cfg(loom)]
use loom::sync::{Condvar, Mutex, MutexGuard};
use static_assertions::const_assert;

mod builder;
mod errors;
mod handle;
mod ring;

pub use builder::FrameQueueBuilder;
pub use errors::{EnqueueError, QueueConfigError};
pub use handle::ProducerHandle;
use ring::RingBuffer;

/// Items that can travel through a [`FrameQueue`].
///
/// The queue itself never inspects items. The producer handle and the
/// consumer loop use these accessors for diagnostics and to decide whether
/// there is anything to render.
pub trait Frame: Send + 'static {
    /// Sequence identifier used in log output only.
    fn sequence_id(&self) -> Option<u64>;

    /// Encoded image payload, if the message carried one.
    fn payload(&self) -> Option<&[u8]>;
}

/// Smallest slot count: one usable slot plus the gap slot.
pub const MIN_QUEUE_CAPACITY: usize = 2;
/// Highest allowed slot count for [`FrameQueueBuilder::capacity`].
pub const MAX_QUEUE_CAPACITY: usize = 10_000;
// Slot count used when the builder is not given one.
const DEFAULT_CAPACITY: usize = 50;
/// Consumer wait interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Producer retry interval for [`Backpressure::retry`].
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

const_assert!(DEFAULT_CAPACITY >= MIN_QUEUE_CAPACITY);
const_assert!(DEFAULT_CAPACITY <= MAX_QUEUE_CAPACITY);

/// Behaviour of [`ProducerHandle::enqueue`] when every usable slot is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backpressure {
    /// Reject the item immediately and log a warning.
    DropOnFull,
    /// Keep waiting for a free slot, checking again every `retry_interval`.
    ///
    /// The producer stalls for as long as the consumer stays behind.
    RetryOnFull {
        /// Upper bound on each wait for free space.
        retry_interval: Duration,
    },
}

impl Backpressure {
    /// Retry-on-full with [`DEFAULT_RETRY_INTERVAL`].
    #[must_use]
    pub const fn retry() -> Self {
        Self::RetryOnFull {
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl Default for Backpressure {
    fn default() -> Self { Self::DropOnFull }
}

/// Backlog size at which the consumer starts shedding items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShedThreshold {
    /// Shed whenever at least this many items remain queued.
    Fixed(usize),
    /// Shed once at least half of the slot count is queued, rounding up for
    /// odd slot counts.
    HalfCapacity,
}

impl ShedThreshold {
    /// Resolve the threshold against a slot count.
    #[must_use]
    pub fn resolve(self, capacity: usize) -> usize {
        match self {
            Self::Fixed(n) => n,
            Self::HalfCapacity => capacity.div_ceil(2),
        }
    }
}

impl Default for ShedThreshold {
    fn default() -> Self { Self::HalfCapacity }
}

/// Settings handed to [`FrameConsumer`](crate::consumer::FrameConsumer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Items remaining after a dequeue at which rendering is skipped.
    pub shedding_threshold: usize,
    /// Longest single wait for new data before the stop signal is rechecked.
    pub poll_interval: Duration,
}

struct State<T> {
    ring: RingBuffer<T>,
    closed: bool,
}

/// State shared by [`FrameQueue`] and every [`ProducerHandle`].
pub(crate) struct Shared<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    backpressure: Backpressure,
}

impl<T> Shared<T> {
    fn new(capacity: usize, backpressure: Backpressure) -> Self {
        Self {
            state: Mutex::new(State {
                ring: RingBuffer::with_slots(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            backpressure,
        }
    }

    // Every critical section leaves the ring consistent, so a panic while
    // holding the lock cannot corrupt it.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn try_push(&self, item: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.lock();
        if state.closed {
            return Err(EnqueueError::Closed(item));
        }
        state.ring.push(item).map_err(EnqueueError::Full)?;
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Wait at most `wait` for a free slot, then attempt the push once.
    pub(crate) fn push_timeout(&self, item: T, wait: Duration) -> Result<(), EnqueueError<T>> {
        let mut state = self.lock();
        if state.ring.is_full() && !state.closed {
            state = match self.not_full.wait_timeout(state, wait) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        if state.closed {
            return Err(EnqueueError::Closed(item));
        }
        state.ring.push(item).map_err(EnqueueError::Full)?;
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    pub(crate) fn try_pop(&self) -> Option<T> {
        let item = self.lock().ring.pop();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Wait at most `wait` for data, then attempt the pop once.
    ///
    /// A spurious wake-up surfaces as `None`, exactly like a timeout.
    pub(crate) fn pop_timeout(&self, wait: Duration) -> Option<T> {
        let mut state = self.lock();
        if state.ring.is_empty() && !state.closed {
            state = match self.not_empty.wait_timeout(state, wait) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        let item = state.ring.pop();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    pub(crate) fn is_empty(&self) -> bool { self.lock().ring.is_empty() }

    pub(crate) fn occupancy(&self) -> usize { self.lock().ring.occupancy() }

    pub(crate) fn is_closed(&self) -> bool { self.lock().closed }

    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub(crate) fn capacity(&self) -> usize { self.capacity }

    pub(crate) fn backpressure(&self) -> Backpressure { self.backpressure }
}

/// Consumer end of a bounded frame queue.
///
/// Created together with a [`ProducerHandle`] by [`FrameQueueBuilder::build`].
/// Dropping the queue closes it, so producers stop waiting for space that
/// will never be freed.
pub struct FrameQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> FrameQueue<T> {
    /// Start building a new queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use frameshed::queue::{Backpressure, FrameQueue, ShedThreshold};
    ///
    /// let (queue, producer, config) = FrameQueue::<u32>::builder()
    ///     .capacity(4)
    ///     .shedding_threshold(ShedThreshold::Fixed(2))
    ///     .backpressure(Backpressure::DropOnFull)
    ///     .build()
    ///     .expect("failed to build FrameQueue");
    ///
    /// producer.try_enqueue(7).expect("enqueue failed");
    /// assert_eq!(queue.try_dequeue(), Some(7));
    /// assert_eq!(config.shedding_threshold, 2);
    /// ```
    #[must_use]
    pub fn builder() -> FrameQueueBuilder<T> { FrameQueueBuilder::default() }

    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self { Self { shared } }

    /// Remove and return the oldest item without blocking.
    ///
    /// Returns `None` when the queue is empty; the indices are left untouched
    /// in that case. A returned item is gone from the queue whatever the
    /// caller does with it next.
    pub fn try_dequeue(&self) -> Option<T> { self.shared.try_pop() }

    /// Remove the oldest item, waiting at most `wait` for one to arrive.
    ///
    /// Returns `None` on timeout, on a spurious wake-up, and when the queue
    /// has been closed and drained.
    pub fn dequeue_timeout(&self, wait: Duration) -> Option<T> { self.shared.pop_timeout(wait) }

    /// Whether no items are queued.
    pub fn is_empty(&self) -> bool { self.shared.is_empty() }

    /// Number of queued items, between zero and [`Self::usable_capacity`].
    pub fn occupancy(&self) -> usize { self.shared.occupancy() }

    /// Slot count chosen at construction, including the gap slot.
    pub fn capacity(&self) -> usize { self.shared.capacity() }

    /// Largest number of items the queue can hold at once.
    pub fn usable_capacity(&self) -> usize { self.shared.capacity() - 1 }

    /// Stop accepting items and wake every waiting producer and consumer.
    ///
    /// Items already queued can still be dequeued.
    pub fn close(&self) { self.shared.close(); }

    /// Whether [`Self::close`] has been called.
    pub fn is_closed(&self) -> bool { self.shared.is_closed() }

    /// Create another producer handle for this queue.
    pub fn producer(&self) -> ProducerHandle<T> { ProducerHandle::from_arc(Arc::clone(&self.shared)) }
}

impl<T> Drop for FrameQueue<T> {
    fn drop(&mut self) { self.shared.close(); }
}
