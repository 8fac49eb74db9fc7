#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for the frame queue using loom.
//!
//! These tests exercise the shared ring buffer from a producer and a consumer
//! thread without sleeps. `loom` explores interleavings to ensure items are
//! never lost, duplicated or reordered and that the full/empty distinction
//! holds under contention.

use frameshed::{EnqueueError, Frame, FrameQueue, QueueItem};
use loom::{model, thread};

#[test]
fn producer_and_consumer_preserve_order() {
    model(|| {
        let (queue, producer, _) = FrameQueue::<QueueItem>::builder()
            .capacity(3)
            .build()
            .expect("failed to build FrameQueue");

        let t = thread::spawn(move || {
            let mut accepted = Vec::new();
            for seq in 0..3 {
                if producer.try_enqueue(QueueItem::new(seq)).is_ok() {
                    accepted.push(seq);
                }
            }
            accepted
        });

        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(item) = queue.try_dequeue() {
                received.extend(item.sequence_id());
            }
        }

        let accepted = t.join().expect("producer thread panicked");
        while let Some(item) = queue.try_dequeue() {
            received.extend(item.sequence_id());
        }
        assert_eq!(received, accepted, "every accepted item arrives once, in order");
    });
}

#[test]
fn full_queue_rejects_until_consumer_frees_a_slot() {
    model(|| {
        let (queue, producer, _) = FrameQueue::<QueueItem>::builder()
            .capacity(2)
            .build()
            .expect("failed to build FrameQueue");
        producer
            .try_enqueue(QueueItem::new(0))
            .expect("initial enqueue should succeed");

        let t = thread::spawn(move || producer.try_enqueue(QueueItem::new(1)));
        let first = queue.try_dequeue().and_then(|item| item.sequence_id());
        let result = t.join().expect("producer thread panicked");

        assert_eq!(first, Some(0));
        match result {
            Ok(()) => {
                assert_eq!(queue.occupancy(), 1);
            }
            Err(EnqueueError::Full(_)) => assert!(queue.is_empty()),
            Err(other) => panic!("unexpected enqueue error: {other:?}"),
        }
    });
}
