//! Multi-channel scan.
//!
//! The scanner runs one [`TunerSession`] per channel, strictly one after
//! another. A device only has a couple of tuners and tuning the same one
//! from two requests at once gives undefined results, so a new session is
//! never started before the previous one reached `Released`.
//!
//! A failing channel never aborts the scan; it is recorded and the next
//! channel is tried.

use std::io::{self, Write};

use hdhr_protocol::{Channel, SignalSample};
use log::{debug, info};

use crate::config::{ChannelFilter, ScanConfig};
use crate::device::TunerDevice;
use crate::error::{Result, ScanError};
use crate::session::TunerSession;

/// Outcome of one pass over a channel list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// One sample per correlated channel, in scan order.
    pub samples: Vec<SignalSample>,
    /// Channels that could not be measured, in scan order.
    pub failed: Vec<String>,
}

impl ScanResult {
    pub fn sample_for(&self, channel_id: &str) -> Option<&SignalSample> {
        self.samples.iter().find(|s| s.channel == channel_id)
    }

    pub fn is_failed(&self, channel_id: &str) -> bool {
        self.failed.iter().any(|id| id == channel_id)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Lowest signal quality among the samples.
    pub fn min_quality(&self) -> Option<u8> {
        self.samples.iter().map(|s| s.signal_quality).min()
    }
}

/// Drives tuning sessions over the configured channels.
pub struct ChannelScanner<D: TunerDevice> {
    device: D,
    config: ScanConfig,
}

impl<D: TunerDevice> ChannelScanner<D> {
    pub fn new(device: D, config: ScanConfig) -> Self {
        Self { device, config }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn filter(&self) -> &ChannelFilter {
        &self.config.filter
    }

    /// Fetch the lineup and keep the channels of interest, in lineup order.
    pub async fn select_channels(&self) -> Result<Vec<Channel>> {
        let lineup = self.device.fetch_lineup().await?;
        let total = lineup.len();
        let channels = self.config.filter.apply(lineup);
        debug!(
            "ChannelScanner: {} of {} lineup channels selected",
            channels.len(),
            total
        );
        Ok(channels)
    }

    /// Measure every channel in `channels`.
    ///
    /// With `quiet` unset, progress is printed to stdout as channels are
    /// measured. Printing has no influence on the returned result.
    pub async fn scan(&self, channels: &[Channel], quiet: bool) -> ScanResult {
        let mut result = ScanResult::default();
        let total = channels.len();

        if !quiet {
            println!("Scanning {} channels...", total);
        }

        for (idx, channel) in channels.iter().enumerate() {
            if !quiet {
                print!(
                    "[{}/{}] Tuning to {:>5} {:<10}... ",
                    idx + 1,
                    total,
                    channel.id,
                    channel.name
                );
                let _ = io::stdout().flush();
            }

            let outcome = TunerSession::new(&self.device, channel, self.config.settle_delay)
                .run()
                .await;

            match outcome.result {
                Ok(sample) => {
                    debug!(
                        "ChannelScanner: {} SS:{}% SQ:{}% SYM:{}%",
                        sample.channel,
                        sample.signal_strength,
                        sample.signal_quality,
                        sample.symbol_quality
                    );
                    if !quiet {
                        println!(
                            "SS:{}% SQ:{}% SYM:{}%",
                            sample.signal_strength, sample.signal_quality, sample.symbol_quality
                        );
                    }
                    result.samples.push(sample);
                }
                Err(e) => {
                    debug!("ChannelScanner: {} failed: {}", channel.id, e);
                    if !quiet {
                        match e {
                            ScanError::Correlation(_) => println!("FAILED"),
                            other => println!("ERROR: {}", other),
                        }
                    }
                    result.failed.push(channel.id.clone());
                }
            }
        }

        info!(
            "ChannelScanner: pass complete, {} measured, {} failed",
            result.samples.len(),
            result.failed.len()
        );
        result
    }
}
