#![cfg(not(loom))]
//! Tests for the consumer loop and its shedding decision.

mod support;

use std::{
    thread,
    time::{Duration, Instant},
};

use frameshed::{
    Backpressure,
    ConsumerStats,
    FrameConsumer,
    QueueItem,
    ShedThreshold,
    StepOutcome,
};
use frameshed_testing::{
    FailingRenderer,
    LoggerHandle,
    RecordingRenderer,
    enqueue_expect,
    image_item,
    logger,
    preload,
};
use rstest::rstest;
use serial_test::serial;
use tokio_util::sync::CancellationToken;

fn consumer(capacity: usize, threshold: usize) -> (FrameConsumer<QueueItem>, frameshed::ProducerHandle<QueueItem>) {
    let (queue, producer, config) = support::builder()
        .capacity(capacity)
        .shedding_threshold(ShedThreshold::Fixed(threshold))
        .build()
        .expect("failed to build FrameQueue");
    (FrameConsumer::new(queue, config), producer)
}

/// Threshold 2, capacity 10, five queued: four remain after the dequeue, so
/// the item is shed without reaching the renderer.
#[test]
fn sheds_when_backlog_reaches_threshold() {
    let (consumer, producer) = consumer(10, 2);
    preload(&producer, 1, 5);
    let mut renderer = RecordingRenderer::default();

    let outcome = consumer.step(&mut renderer);

    assert_eq!(
        outcome,
        StepOutcome::Shed {
            sequence_id: Some(1),
            occupancy: 4,
        }
    );
    assert!(renderer.rendered().is_empty(), "renderer must not run");
    assert_eq!(consumer.queue().occupancy(), 4, "shed item still leaves the queue");
}

/// Occupancy exactly at the threshold sheds; one below renders.
#[rstest]
#[case::at_threshold(3, true)]
#[case::below_threshold(2, false)]
fn threshold_boundary(#[case] queued: u64, #[case] shed: bool) {
    let (consumer, producer) = consumer(10, 2);
    preload(&producer, 1, queued);
    let mut renderer = RecordingRenderer::default();

    let outcome = consumer.step(&mut renderer);
    assert_eq!(matches!(outcome, StepOutcome::Shed { .. }), shed);
    assert_eq!(renderer.rendered().is_empty(), shed);
}

/// With an odd slot count, half-capacity shedding starts only once the
/// backlog reaches half the slot count rounded up.
#[rstest]
#[case::fifteen_waiting_renders(16, false)]
#[case::sixteen_waiting_sheds(17, true)]
fn half_capacity_boundary_with_odd_slot_count(#[case] queued: u64, #[case] shed: bool) {
    let (queue, producer, config) = support::builder()
        .capacity(31)
        .shedding_threshold(ShedThreshold::HalfCapacity)
        .build()
        .expect("failed to build FrameQueue");
    let consumer = FrameConsumer::new(queue, config);
    preload(&producer, 1, queued);
    let mut renderer = RecordingRenderer::default();

    let outcome = consumer.step(&mut renderer);
    let occupancy = usize::try_from(queued - 1).expect("backlog fits in usize");
    if shed {
        assert_eq!(
            outcome,
            StepOutcome::Shed {
                sequence_id: Some(1),
                occupancy,
            }
        );
    } else {
        assert_eq!(
            outcome,
            StepOutcome::Rendered {
                sequence_id: Some(1),
                occupancy,
            }
        );
        assert_eq!(renderer.rendered(), vec![Some(1)]);
    }
}

#[test]
fn renders_when_backlog_is_small() {
    let (consumer, producer) = consumer(10, 5);
    enqueue_expect!(producer, image_item(42));
    let mut renderer = RecordingRenderer::default();

    let outcome = consumer.step(&mut renderer);

    assert_eq!(
        outcome,
        StepOutcome::Rendered {
            sequence_id: Some(42),
            occupancy: 0,
        }
    );
    assert_eq!(renderer.rendered(), vec![Some(42)]);
}

#[test]
fn items_without_payload_are_skipped() {
    let (consumer, producer) = consumer(10, 5);
    enqueue_expect!(producer, QueueItem::new(8).with_field("objects", 3));
    let mut renderer = RecordingRenderer::default();

    let outcome = consumer.step(&mut renderer);

    assert!(matches!(
        outcome,
        StepOutcome::SkippedNoPayload {
            sequence_id: Some(8),
            ..
        }
    ));
    assert!(renderer.rendered().is_empty());
}

/// A failing decode is logged and the loop carries on with the next item.
#[rstest]
#[serial(logging)]
fn render_failures_are_not_fatal(mut logger: LoggerHandle) {
    let (consumer, producer) = consumer(10, 5);
    preload(&producer, 1, 2);
    logger.clear();
    let mut renderer = FailingRenderer::default();

    assert!(matches!(
        consumer.step(&mut renderer),
        StepOutcome::RenderFailed { sequence_id: Some(1), .. }
    ));
    assert!(matches!(
        consumer.step(&mut renderer),
        StepOutcome::RenderFailed { sequence_id: Some(2), .. }
    ));
    assert_eq!(renderer.attempts, 2);
    assert!(consumer.queue().is_empty());

    let warnings = logger.take_matching(log::Level::Warn, "render failed");
    assert_eq!(warnings.len(), 2);
}

#[rstest]
#[serial(logging)]
fn shed_items_are_logged_with_occupancy(mut logger: LoggerHandle) {
    let (consumer, producer) = consumer(10, 2);
    preload(&producer, 1, 5);
    logger.clear();

    consumer.step(&mut RecordingRenderer::default());

    let skipped = logger.take_matching(log::Level::Info, "skip process");
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].contains("occupancy=4"), "unexpected log: {}", skipped[0]);
}

#[test]
fn idle_step_returns_after_poll_interval() {
    let (consumer, _producer) = consumer(10, 5);
    let started = Instant::now();
    assert_eq!(consumer.step(&mut RecordingRenderer::default()), StepOutcome::Idle);
    assert!(started.elapsed() < Duration::from_secs(1));
}

/// Draining a backlog sheds the front of it and renders the tail once the
/// backlog falls below the threshold, all in arrival order.
#[test]
fn backlog_drain_sheds_then_renders() {
    let (consumer, producer) = consumer(10, 3);
    preload(&producer, 1, 9);
    let mut renderer = RecordingRenderer::default();
    let mut stats = ConsumerStats::default();

    while !consumer.queue().is_empty() {
        stats.record(consumer.step(&mut renderer));
    }

    // occupancy after each dequeue runs 8, 7, ... 0; the last three render
    assert_eq!(stats.shed, 6);
    assert_eq!(stats.rendered, 3);
    assert_eq!(renderer.rendered(), vec![Some(7), Some(8), Some(9)]);
}

#[test]
fn run_stops_on_cancellation() {
    let (consumer, producer) = consumer(10, 5);
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let renderer = RecordingRenderer::default();
    let mut worker_renderer = renderer.clone();
    let worker = thread::spawn(move || consumer.run(&mut worker_renderer, &token));

    enqueue_expect!(producer, image_item(1));
    let deadline = Instant::now() + Duration::from_secs(5);
    while renderer.rendered().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    shutdown.cancel();

    let stats = worker.join().expect("consumer thread panicked");
    assert_eq!(stats.rendered, 1);
    assert_eq!(renderer.rendered(), vec![Some(1)]);
}

#[test]
fn run_drains_then_exits_when_producer_closes() {
    let (consumer, producer) = consumer(10, 100);
    preload(&producer, 1, 5);
    producer.close();

    let mut renderer = RecordingRenderer::default();
    let stats = consumer.run(&mut renderer, &CancellationToken::new());

    assert_eq!(stats.rendered, 5);
    assert_eq!(stats.dequeued(), 5);
    assert_eq!(renderer.rendered(), (1..=5).map(Some).collect::<Vec<_>>());
}

/// A slow renderer fed faster than it can keep up sheds work, while every
/// item is still dequeued exactly once and in order.
#[test]
fn slow_renderer_sheds_under_overload() {
    let (queue, producer, config) = support::builder()
        .capacity(30)
        .shedding_threshold(ShedThreshold::Fixed(5))
        .backpressure(Backpressure::retry())
        .build()
        .expect("failed to build FrameQueue");
    let consumer = FrameConsumer::new(queue, config);
    let renderer = RecordingRenderer::with_delay(Duration::from_millis(5));
    let mut worker_renderer = renderer.clone();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let worker = thread::spawn(move || consumer.run(&mut worker_renderer, &token));

    for seq in 1..=100 {
        producer.enqueue(image_item(seq)).expect("retry policy should not drop");
    }
    producer.close();

    let stats = worker.join().expect("consumer thread panicked");
    assert_eq!(stats.dequeued(), 100);
    assert!(stats.shed > 0, "overload should shed some frames");

    let rendered = renderer.rendered();
    assert_eq!(rendered.len() as u64, stats.rendered);
    assert!(rendered.windows(2).all(|w| w[0] < w[1]), "render order must follow arrival order");
}
