//! Terminal progress display for a run
//!
//! Consumes the coordinator's [`ProgressEvent`]s and renders them with an
//! indicatif progress bar on stderr: one step per tile with its size and
//! fetch speed, then a summary of the whole fetch. In quiet mode the bar is
//! hidden and nothing is printed.

use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::coordinator::ProgressEvent;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar driven by progress events
pub struct ProgressDisplay {
    bar: ProgressBar,
    quiet: bool,
    bytes: u64,
    fetch_time: Duration,
}

impl ProgressDisplay {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar
        };

        Self {
            bar,
            quiet,
            bytes: 0,
            fetch_time: Duration::ZERO,
        }
    }

    /// Render events from `event_rx` on a background task until the channel closes
    pub fn spawn(mut self, mut event_rx: mpsc::UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                self.handle_event(&event);
            }
            if !self.bar.is_finished() {
                self.bar.finish_and_clear();
            }
            debug!("Progress display finished");
        })
    }

    /// Apply one event to the display
    pub fn handle_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::FetchStarted { rect, zoom, total } => {
                self.bar.set_length(*total);
                self.bar.set_position(0);
                self.bar.set_message(format!("zoom {}, {}", zoom, rect));
            }
            ProgressEvent::TileFetched {
                index,
                bytes,
                elapsed,
                ..
            } => {
                self.bytes += bytes;
                self.fetch_time += *elapsed;
                self.bar.inc(1);
                self.bar
                    .set_message(format!("{} {}", index, transfer_line(*bytes, *elapsed)));
            }
            ProgressEvent::MergeStarted { tiles } => {
                self.bar.set_message(format!("merging {} tiles", tiles));
            }
            ProgressEvent::MergeFinished(summary) => {
                self.bar.finish_and_clear();
                self.print(self.summary_line());
                self.print(format!(
                    "Wrote {}x{} mosaic to {}",
                    summary.width,
                    summary.height,
                    summary.path.display()
                ));
            }
            ProgressEvent::CachePurged(report) => {
                if report.failed > 0 {
                    self.print(format!(
                        "Removed {} cached tiles, {} could not be removed",
                        report.removed, report.failed
                    ));
                } else {
                    self.print(format!("Removed {} cached tiles", report.removed));
                }
            }
            ProgressEvent::Cancelled { fetched, total } => {
                self.bar.abandon_with_message("cancelled");
                self.print(format!("Cancelled after {} of {} tiles", fetched, total));
            }
        }
    }

    /// Total fetched bytes, time and average rate so far
    pub fn summary_line(&self) -> String {
        format!(
            "Downloaded totally {} within {} ms @ {}",
            HumanBytes(self.bytes),
            self.fetch_time.as_millis(),
            format_rate(self.bytes, self.fetch_time)
        )
    }

    fn print(&self, line: String) {
        if !self.quiet {
            eprintln!("{}", line);
        }
    }
}

/// Size and speed of one transfer, e.g. `12.50 KiB @ 25.00 KiB/s`
pub fn transfer_line(bytes: u64, elapsed: Duration) -> String {
    format!("{} @ {}", HumanBytes(bytes), format_rate(bytes, elapsed))
}

/// Human-readable transfer rate
pub fn format_rate(bytes: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return "-".to_string();
    }
    format!("{}/s", HumanBytes((bytes as f64 / secs) as u64))
}
