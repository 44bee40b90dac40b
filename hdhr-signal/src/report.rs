//! Scan summary and snapshot files.
//!
//! A one-shot scan is saved as a JSON snapshot so that runs taken with
//! different antenna orientations can be compared later:
//!
//! ```json
//! {
//!   "timestamp": "20260101_120000",
//!   "summary": {
//!     "total_channels": 1,
//!     "avg_signal_strength": 80.0,
//!     "avg_signal_quality": 90.0,
//!     "channels_with_100_quality": 0
//!   },
//!   "channels": [
//!     {"channel": "4.1", "name": "FOX", "signal_strength": 80, "signal_quality": 90, "symbol_quality": 95}
//!   ]
//! }
//! ```
//!
//! Field names are read by external tooling and must stay as they are.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use hdhr_protocol::SignalSample;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scanner::ScanResult;

/// Timestamp layout used in snapshots and file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Aggregate figures for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Stored at the top level of the snapshot, not inside `summary`.
    #[serde(skip)]
    pub timestamp: String,
    pub total_channels: usize,
    pub avg_signal_strength: f64,
    pub avg_signal_quality: f64,
    pub channels_with_100_quality: usize,
}

/// Compute the summary of `result`.
///
/// Averages are rounded to one decimal and are 0 for an empty result.
pub fn summarize(result: &ScanResult, timestamp: impl Into<String>) -> ScanSummary {
    let samples = &result.samples;
    let count = samples.len();

    let (avg_strength, avg_quality) = if count == 0 {
        (0.0, 0.0)
    } else {
        let strength: u64 = samples.iter().map(|s| s.signal_strength as u64).sum();
        let quality: u64 = samples.iter().map(|s| s.signal_quality as u64).sum();
        (strength as f64 / count as f64, quality as f64 / count as f64)
    };

    ScanSummary {
        timestamp: timestamp.into(),
        total_channels: count,
        avg_signal_strength: round1(avg_strength),
        avg_signal_quality: round1(avg_quality),
        channels_with_100_quality: samples.iter().filter(|s| s.signal_quality == 100).count(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Contents of an output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub timestamp: String,
    pub summary: ScanSummary,
    pub channels: Vec<SignalSample>,
}

impl ScanSnapshot {
    pub fn new(summary: ScanSummary, channels: Vec<SignalSample>) -> Self {
        Self {
            timestamp: summary.timestamp.clone(),
            summary,
            channels,
        }
    }

    /// Build the snapshot of a finished scan.
    pub fn from_result(result: &ScanResult, timestamp: impl Into<String>) -> Self {
        Self::new(summarize(result, timestamp), result.samples.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut snapshot: ScanSnapshot = serde_json::from_str(json)?;
        snapshot.summary.timestamp = snapshot.timestamp.clone();
        Ok(snapshot)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// `antenna_scan_<timestamp>.json`, or `antenna_scan_<label>_<timestamp>.json`
/// when an orientation label is given.
pub fn snapshot_file_name(label: Option<&str>, timestamp: &str) -> String {
    match label {
        Some(label) => format!("antenna_scan_{}_{}.json", label, timestamp),
        None => format!("antenna_scan_{}.json", timestamp),
    }
}

/// Print the end-of-scan summary block.
pub fn print_summary(summary: &ScanSummary, saved_to: &str) {
    println!();
    println!("=== SUMMARY ===");
    println!("Total channels: {}", summary.total_channels);
    println!("Avg signal strength: {:.1}%", summary.avg_signal_strength);
    println!("Avg signal quality: {:.1}%", summary.avg_signal_quality);
    println!(
        "Channels with 100% quality: {}/{}",
        summary.channels_with_100_quality, summary.total_channels
    );
    println!();
    println!("Results saved to: {}", saved_to);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(channel: &str, strength: u8, quality: u8) -> SignalSample {
        SignalSample {
            channel: channel.to_string(),
            name: format!("CH{}", channel),
            signal_strength: strength,
            signal_quality: quality,
            symbol_quality: 100,
        }
    }

    #[test]
    fn test_summary_empty() {
        let summary = summarize(&ScanResult::default(), "20260101_000000");
        assert_eq!(summary.total_channels, 0);
        assert_eq!(summary.avg_signal_strength, 0.0);
        assert_eq!(summary.avg_signal_quality, 0.0);
        assert_eq!(summary.channels_with_100_quality, 0);
    }

    #[test]
    fn test_summary_mean_and_perfect_count() {
        let result = ScanResult {
            samples: vec![sample("4.1", 80, 100), sample("5.1", 71, 92), sample("8.8", 66, 100)],
            failed: vec!["13.1".to_string()],
        };
        let summary = summarize(&result, "20260101_000000");

        assert_eq!(summary.total_channels, 3);
        // (80 + 71 + 66) / 3 = 72.333...
        assert_eq!(summary.avg_signal_strength, 72.3);
        // (100 + 92 + 100) / 3 = 97.333...
        assert_eq!(summary.avg_signal_quality, 97.3);
        assert_eq!(summary.channels_with_100_quality, 2);
    }

    #[test]
    fn test_summary_rounding_up() {
        let result = ScanResult {
            samples: vec![sample("4.1", 0, 90), sample("5.1", 0, 91), sample("8.8", 0, 91)],
            failed: vec![],
        };
        // 272 / 3 = 90.666...
        assert_eq!(summarize(&result, "t").avg_signal_quality, 90.7);
    }

    #[test]
    fn test_summary_single_channel_scenario() {
        let result = ScanResult {
            samples: vec![SignalSample {
                channel: "4.1".into(),
                name: "FOX".into(),
                signal_strength: 80,
                signal_quality: 90,
                symbol_quality: 95,
            }],
            failed: vec![],
        };
        let summary = summarize(&result, "t");
        assert_eq!(summary.avg_signal_strength, 80.0);
        assert_eq!(summary.avg_signal_quality, 90.0);
        assert_eq!(summary.channels_with_100_quality, 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let result = ScanResult {
            samples: vec![sample("4.1", 80, 100), sample("5.1", 71, 92)],
            failed: vec![],
        };
        let snapshot = ScanSnapshot::from_result(&result, "20260314_093000");

        let json = snapshot.to_json().unwrap();
        let parsed = ScanSnapshot::from_json(&json).unwrap();

        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.summary.timestamp, "20260314_093000");
        assert_eq!(parsed.channels, result.samples);
    }

    #[test]
    fn test_snapshot_field_names() {
        let result = ScanResult {
            samples: vec![sample("4.1", 80, 90)],
            failed: vec![],
        };
        let snapshot = ScanSnapshot::from_result(&result, "20260314_093000");
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(value["timestamp"], "20260314_093000");
        assert_eq!(value["summary"]["total_channels"], 1);
        assert_eq!(value["summary"]["avg_signal_strength"], 80.0);
        assert_eq!(value["summary"]["avg_signal_quality"], 90.0);
        assert_eq!(value["summary"]["channels_with_100_quality"], 0);
        assert!(value["summary"].get("timestamp").is_none());
        assert_eq!(value["channels"][0]["channel"], "4.1");
        assert_eq!(value["channels"][0]["name"], "CH4.1");
        assert_eq!(value["channels"][0]["signal_strength"], 80);
        assert_eq!(value["channels"][0]["signal_quality"], 90);
        assert_eq!(value["channels"][0]["symbol_quality"], 100);
    }

    #[test]
    fn test_snapshot_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(snapshot_file_name(None, "20260101_000000"));
        let snapshot = ScanSnapshot::from_result(&ScanResult::default(), "20260101_000000");

        snapshot.write_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert_eq!(ScanSnapshot::from_json(&contents).unwrap(), snapshot);
        assert!(contents.contains("\n  \"summary\": {"));
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(
            snapshot_file_name(None, "20260101_120000"),
            "antenna_scan_20260101_120000.json"
        );
        assert_eq!(
            snapshot_file_name(Some("north"), "20260101_120000"),
            "antenna_scan_north_20260101_120000.json"
        );
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
