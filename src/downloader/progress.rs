//! Background progress reporting for a single file.
//!
//! Workers push the advertised size of each segment they land onto an unbounded
//! channel; one reporter task per file sums them and periodically redraws a status
//! line on stderr.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::utils::{format_eta, format_size};

/// Interval between status line redraws
const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Byte accounting against a precomputed total.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    total_size: u64,
    received: u64,
}

impl ProgressTracker {
    /// Tracker expecting `total_size` bytes.
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            received: 0,
        }
    }

    /// Add `bytes` to the running total.
    pub fn record(&mut self, bytes: u64) {
        self.received = self.received.saturating_add(bytes);
    }

    /// Bytes received so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Whether the expected total has been reached
    pub fn is_complete(&self) -> bool {
        self.received >= self.total_size
    }

    /// Completion in percent, capped at 100
    pub fn percent(&self) -> f64 {
        if self.total_size == 0 {
            return 100.0;
        }
        (self.received as f64 / self.total_size as f64 * 100.0).min(100.0)
    }

    /// Average rate in bytes per second over `elapsed`
    pub fn rate(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.received as f64 / secs
        } else {
            0.0
        }
    }

    /// Seconds until completion at the current rate, if a rate is known
    pub fn eta(&self, elapsed: Duration) -> Option<u64> {
        let rate = self.rate(elapsed);
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.total_size.saturating_sub(self.received);
        Some((remaining as f64 / rate).ceil() as u64)
    }

    /// Status line: received, percent, rate and ETA.
    pub fn render(&self, elapsed: Duration) -> String {
        let eta = self
            .eta(elapsed)
            .map(format_eta)
            .unwrap_or_else(|| "--:--".to_string());
        format!(
            "{} {:5.1}% {}/s ETA {}",
            format_size(self.received as f64),
            self.percent(),
            format_size(self.rate(elapsed)),
            eta
        )
    }
}

/// Spawn the reporter for one file.
///
/// The task ends once `total_size` bytes have been reported or every sender has
/// been dropped, and yields the bytes it saw. With `render` off it only counts.
pub(crate) fn spawn_progress_reporter(
    total_size: u64,
    mut progress_rx: mpsc::UnboundedReceiver<u64>,
    render: bool,
) -> tokio::task::JoinHandle<u64> {
    tokio::spawn(async move {
        let started = Instant::now();
        let mut tracker = ProgressTracker::new(total_size);
        let mut interval = tokio::time::interval(PROGRESS_UPDATE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !tracker.is_complete() {
            tokio::select! {
                msg = progress_rx.recv() => {
                    let Some(bytes) = msg else {
                        // All workers done
                        break;
                    };
                    tracker.record(bytes);
                }
                _ = interval.tick() => {
                    if render {
                        draw(&tracker.render(started.elapsed()), false);
                    }
                }
            }
        }

        if render {
            draw(&tracker.render(started.elapsed()), true);
        }
        tracker.received()
    })
}

fn draw(line: &str, last: bool) {
    let mut stderr = std::io::stderr().lock();
    let end = if last { "\n" } else { "" };
    // A broken stderr must not interrupt the download.
    let _ = write!(stderr, "\r{}{}", line, end);
    let _ = stderr.flush();
}
