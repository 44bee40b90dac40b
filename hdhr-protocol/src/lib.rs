//! Wire definitions for the HDHomeRun HTTP tuner API.
//!
//! A networked tuner exposes three endpoints that matter for signal
//! measurement:
//!
//! ```text
//! GET http://<host>/lineup.json            -> [{GuideNumber, GuideName, ...}]
//! GET http://<host>:5004/auto/v<Guide>     -> MPEG-TS stream (open = tune)
//! GET http://<host>/status.json            -> [{VctNumber, Signal*Percent, ...}]
//! ```
//!
//! This crate only knows how to name those endpoints and how to decode
//! their JSON payloads. It performs no I/O.
//!
//! # Example
//!
//! ```rust
//! use hdhr_protocol::{decode_status, find_tuner_for};
//!
//! let body = br#"[{"Resource":"tuner0","VctNumber":"4.1","SignalStrengthPercent":80,
//!                  "SignalQualityPercent":90,"SymbolQualityPercent":95},
//!                 {"Resource":"tuner1"}]"#;
//! let status = decode_status(body).unwrap();
//!
//! let tuner = find_tuner_for(&status, "4.1").unwrap();
//! assert_eq!(tuner.signal_quality_percent, 90);
//! assert!(find_tuner_for(&status, "5.1").is_none());
//! ```

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{
    decode_lineup, decode_status, find_tuner_for, DeviceEndpoints, DEFAULT_HTTP_PORT,
    DEFAULT_STREAM_PORT,
};
pub use error::ProtocolError;
pub use types::{Channel, LineupEntry, SignalSample, TunerStatus};
