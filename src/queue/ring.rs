//! Fixed-size ring buffer backing [`FrameQueue`](super::FrameQueue).
//!
//! The buffer keeps one slot permanently unused so that a full buffer can be
//! told apart from an empty one using only the two indices: equal indices
//! mean empty, and a producer index one step behind the consumer index means
//! full. Usable capacity is therefore `slots - 1`.
//!
//! `RingBuffer` performs no synchronisation of its own. The queue wraps it in
//! a mutex and holds the lock only while indices and slots change.

#[derive(Debug)]
pub(crate) struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    producer: usize,
    consumer: usize,
}

impl<T> RingBuffer<T> {
    /// Allocate `slots` empty slots.
    ///
    /// Callers validate `slots >= 2` before construction.
    pub(crate) fn with_slots(slots: usize) -> Self {
        debug_assert!(slots >= 2, "ring buffer needs a gap slot");
        Self {
            slots: std::iter::repeat_with(|| None).take(slots).collect(),
            producer: 0,
            consumer: 0,
        }
    }

    fn advance(&self, index: usize) -> usize { (index + 1) % self.slots.len() }

    pub(crate) fn is_empty(&self) -> bool { self.producer == self.consumer }

    pub(crate) fn is_full(&self) -> bool { self.advance(self.producer) == self.consumer }

    /// Number of stored items, derived from the indices.
    pub(crate) fn occupancy(&self) -> usize {
        if self.producer >= self.consumer {
            self.producer - self.consumer
        } else {
            self.slots.len() - self.consumer + self.producer
        }
    }

    /// Store `item` in the producer slot.
    ///
    /// Hands the item back untouched when the buffer is full.
    pub(crate) fn push(&mut self, item: T) -> Result<(), T> {
        let next = self.advance(self.producer);
        if next == self.consumer {
            return Err(item);
        }
        self.slots[self.producer] = Some(item);
        self.producer = next;
        Ok(())
    }

    /// Remove and return the item at the consumer slot.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.consumer].take();
        self.consumer = self.advance(self.consumer);
        item
    }

    #[cfg(test)]
    fn indices(&self) -> (usize, usize) { (self.producer, self.consumer) }
}
