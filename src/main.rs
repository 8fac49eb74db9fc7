//! Demo binary for `frameshed`.
//!
//! Publishes synthetic broker messages into a frame queue from one thread and
//! renders them on another with a simulated decoder, so the effect of queue
//! size, backpressure and shedding settings shows up in the logs.

mod cli;

use std::{net::SocketAddr, thread, time::Duration};

use clap::Parser;
use frameshed::{
    Backpressure,
    Frame,
    FrameConsumer,
    FrameQueue,
    FrameRenderer,
    ProducerHandle,
    QueueItem,
    RenderError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::{BackpressureMode, Cli};

/// Base64 text of a JPEG start-of-image marker.
const JPEG_B64_PREFIX: &[u8] = b"/9j/";

/// Broker payload for frame `seq`.
///
/// Every twentieth message carries no image and every seventeenth a corrupt
/// one, so the skip paths are exercised too.
fn synthetic_payload(seq: u64) -> String {
    if seq % 20 == 0 {
        format!(r#"{{"seqId":{seq},"streamId":0}}"#)
    } else if seq % 17 == 0 {
        format!(r#"{{"seqId":{seq},"streamId":0,"frameData":"AAAA"}}"#)
    } else {
        let body = "A".repeat(1024);
        format!(r#"{{"seqId":{seq},"streamId":0,"frameData":"/9j/{body}"}}"#)
    }
}

fn publish_frames(
    producer: &ProducerHandle<QueueItem>,
    frames: u64,
    interval: Duration,
    shutdown: &CancellationToken,
) -> u64 {
    let mut accepted = 0;
    for seq in 1..=frames {
        if shutdown.is_cancelled() {
            break;
        }
        let payload = synthetic_payload(seq);
        let item = match QueueItem::from_json(payload.as_bytes()) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "unable to parse message");
                continue;
            }
        };
        match producer.enqueue(item) {
            Ok(()) => accepted += 1,
            Err(e) if e.is_full() => {}
            Err(_) => break,
        }
        thread::sleep(interval);
    }
    producer.close();
    accepted
}

/// Stand-in for image decode, colour conversion and display.
struct SimulatedRenderer {
    cost: Duration,
}

impl FrameRenderer<QueueItem> for SimulatedRenderer {
    fn render(&mut self, item: &QueueItem, payload: &[u8]) -> Result<(), RenderError> {
        if !payload.starts_with(JPEG_B64_PREFIX) {
            return Err(RenderError::Decode(
                "payload is not a base64 JPEG image".to_owned(),
            ));
        }
        thread::sleep(self.cost);
        debug!(
            sequence_id = ?item.sequence_id(),
            bytes = payload.len(),
            "frame rendered"
        );
        Ok(())
    }
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    info!(%addr, "metrics exporter listening");
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    warn!(%addr, "built without the metrics feature; exporter disabled");
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = cli.metrics_listen {
        install_metrics_exporter(addr)?;
    }

    let backpressure = match cli.backpressure {
        BackpressureMode::Drop => Backpressure::DropOnFull,
        BackpressureMode::Retry => Backpressure::RetryOnFull {
            retry_interval: Duration::from_millis(cli.retry_interval_ms),
        },
    };
    let (queue, producer, config) = FrameQueue::<QueueItem>::builder()
        .capacity(cli.capacity)
        .backpressure(backpressure)
        .shedding_threshold(cli.threshold)
        .poll_interval(Duration::from_millis(cli.poll_interval_ms))
        .build()?;
    info!(
        capacity = cli.capacity,
        threshold = config.shedding_threshold,
        ?backpressure,
        "frame queue ready"
    );

    let shutdown = CancellationToken::new();
    let consumer = FrameConsumer::new(queue, config);
    let consumer_token = shutdown.clone();
    let render_cost = Duration::from_millis(cli.render_cost_ms);
    let consumer_thread = thread::Builder::new()
        .name("frame-consumer".to_owned())
        .spawn(move || {
            let mut renderer = SimulatedRenderer { cost: render_cost };
            consumer.run(&mut renderer, &consumer_token)
        })?;

    let feed_token = shutdown.clone();
    let frames = cli.frames;
    let feed_interval = Duration::from_millis(cli.feed_interval_ms);
    let mut feed = tokio::task::spawn_blocking(move || {
        publish_frames(&producer, frames, feed_interval, &feed_token)
    });

    let accepted = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("interrupted; stopping");
            shutdown.cancel();
            (&mut feed).await?
        }
        res = &mut feed => res?,
    };

    let stats = tokio::task::spawn_blocking(move || consumer_thread.join())
        .await?
        .map_err(|_| "frame consumer thread panicked")?;
    info!(
        published = frames,
        accepted,
        rendered = stats.rendered,
        shed = stats.shed,
        skipped = stats.skipped_no_payload,
        failed = stats.render_failed,
        "run complete"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable structured logging for the demo.
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}
