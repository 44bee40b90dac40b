//! hdhr-signal: per-channel signal measurement for HDHomeRun tuners.
//!
//! The device never reports signal figures for a channel on request. A
//! tuner has to be streaming that channel first, so every measurement
//! opens a stream, waits for the tuner to settle, reads `status.json`
//! while the stream is still open and then closes it again. This crate
//! wraps that dance in a [`TunerSession`] and drives one session per
//! channel from [`ChannelScanner`].
//!
//! Two front ends sit on top:
//! - a one-shot scan that prints progress and saves a [`ScanSnapshot`];
//! - [`MonitorLoop`], which repeats quiet scans and prints one line per pass.

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod report;
pub mod scanner;
pub mod session;

pub use config::{load_config, AppConfig, ChannelFilter, DeviceConfig, MonitorConfig, ScanConfig};
pub use device::{HdhrClient, StreamHandle, TunerDevice};
pub use error::{Result, ScanError};
pub use monitor::{render_line, MonitorLoop, PassOutcome};
pub use report::{snapshot_file_name, summarize, ScanSnapshot, ScanSummary};
pub use scanner::{ChannelScanner, ScanResult};
pub use session::{SessionOutcome, SessionState, TunerSession};
