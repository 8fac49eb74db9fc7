//! Command line interface for the `frameshed` demo binary.
//!
//! The binary feeds synthetic frames through a queue and a simulated
//! renderer so queue, backpressure and shedding settings can be tried out.

use clap::{Parser, ValueEnum};
use frameshed::ShedThreshold;

/// Producer behaviour when the queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackpressureMode {
    /// Drop the frame and log a warning.
    Drop,
    /// Wait for free space, retrying every `--retry-interval-ms`.
    Retry,
}

/// Parse `--threshold`: `half` in any case, or a frame count.
///
/// # Errors
///
/// Returns a message for clap to report when `raw` is neither.
pub fn parse_threshold(raw: &str) -> Result<ShedThreshold, String> {
    if raw.eq_ignore_ascii_case("half") {
        return Ok(ShedThreshold::HalfCapacity);
    }
    raw.parse()
        .map(ShedThreshold::Fixed)
        .map_err(|e| format!("expected a frame count or `half`: {e}"))
}

/// Command line arguments for the `frameshed` binary.
#[derive(Debug, Parser)]
#[command(name = "frameshed", version, about = "Bounded frame queue with load shedding")]
pub struct Cli {
    /// Ring buffer slot count; one slot is kept free.
    #[arg(long, default_value_t = 50)]
    pub capacity: usize,
    /// Backlog at which frames are shed: a number, or `half` for half the
    /// capacity rounded up.
    #[arg(long, default_value = "half", value_parser = parse_threshold)]
    pub threshold: ShedThreshold,
    /// Longest consumer wait before the stop signal is rechecked.
    #[arg(long, default_value_t = 10)]
    pub poll_interval_ms: u64,
    /// Producer policy for a full queue.
    #[arg(long, value_enum, default_value_t = BackpressureMode::Drop)]
    pub backpressure: BackpressureMode,
    /// Wait between enqueue attempts under the retry policy.
    #[arg(long, default_value_t = 100)]
    pub retry_interval_ms: u64,
    /// Number of synthetic frames to publish before stopping.
    #[arg(long, default_value_t = 200)]
    pub frames: u64,
    /// Delay between synthetic frames.
    #[arg(long, default_value_t = 5)]
    pub feed_interval_ms: u64,
    /// Simulated decode and display time per rendered frame.
    #[arg(long, default_value_t = 20)]
    pub render_cost_ms: u64,
    /// Address for the Prometheus exporter, e.g. `127.0.0.1:9000`.
    #[arg(long)]
    pub metrics_listen: Option<std::net::SocketAddr>,
}
