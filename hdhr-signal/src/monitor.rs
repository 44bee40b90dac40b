//! Continuous signal monitor.
//!
//! Repeats quiet scans and prints one line per pass, for watching the
//! effect of moving the antenna:
//!
//! ```text
//! [14:02:11] FOX:100% | KSL:97% | ION:FAIL | MIN:FAILED
//! ```
//!
//! Cancellation is only honoured between passes. A pass that has started
//! always runs to the end, so every tuner it opened is released before
//! [`MonitorLoop::run`] returns.

use std::io::{self, Write};

use chrono::Local;
use hdhr_protocol::Channel;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::config::{ChannelFilter, MonitorConfig};
use crate::device::TunerDevice;
use crate::scanner::{ChannelScanner, ScanResult};

/// Result of one monitor pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The lineup was fetched and the channels scanned.
    Scanned {
        channels: Vec<Channel>,
        result: ScanResult,
    },
    /// The lineup could not be fetched; every configured channel counts
    /// as failed for this pass.
    LineupFailed { ids: Vec<String>, error: String },
}

/// Render a pass as `label:quality% | label:FAIL | ... | MIN:...`.
pub fn render_line(outcome: &PassOutcome, filter: &ChannelFilter) -> String {
    let mut parts: Vec<String> = Vec::new();

    match outcome {
        PassOutcome::Scanned { channels, result } => {
            for channel in channels {
                let label = filter.label(&channel.id);
                match result.sample_for(&channel.id) {
                    Some(sample) => parts.push(format!("{}:{}%", label, sample.signal_quality)),
                    None => parts.push(format!("{}:FAIL", label)),
                }
            }

            if result.has_failures() {
                parts.push("MIN:FAILED".to_string());
            } else if let Some(min) = result.min_quality() {
                parts.push(format!("MIN:{}%", min));
            }
        }
        PassOutcome::LineupFailed { ids, .. } => {
            for id in ids {
                parts.push(format!("{}:FAIL", filter.label(id)));
            }
            parts.push("MIN:FAILED".to_string());
        }
    }

    parts.join(" | ")
}

/// Cancellable loop of quiet scans.
pub struct MonitorLoop<'a, D: TunerDevice> {
    scanner: &'a ChannelScanner<D>,
    config: MonitorConfig,
    cancel: CancellationToken,
}

impl<'a, D: TunerDevice> MonitorLoop<'a, D> {
    pub fn new(scanner: &'a ChannelScanner<D>, config: MonitorConfig, cancel: CancellationToken) -> Self {
        Self {
            scanner,
            config,
            cancel,
        }
    }

    /// One full pass. Never fails: an unreachable device yields
    /// [`PassOutcome::LineupFailed`].
    pub async fn run_pass(&self) -> PassOutcome {
        match self.scanner.select_channels().await {
            Ok(channels) => {
                let result = self.scanner.scan(&channels, true).await;
                PassOutcome::Scanned { channels, result }
            }
            Err(e) => {
                warn!("MonitorLoop: lineup unavailable, pass failed: {}", e);
                PassOutcome::LineupFailed {
                    ids: self.scanner.filter().ids().to_vec(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run passes until cancelled, writing one line per pass to `out`.
    ///
    /// Returns the number of completed passes.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<usize> {
        let mut passes = 0usize;

        while !self.cancel.is_cancelled() {
            let outcome = self.run_pass().await;
            passes += 1;

            let line = render_line(&outcome, self.scanner.filter());
            writeln!(out, "[{}] {}", Local::now().format("%H:%M:%S"), line)?;
            out.flush()?;

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        debug!("MonitorLoop: stopped after {} passes", passes);
        Ok(passes)
    }
}
