//! Error types for scanning.

use hdhr_protocol::ProtocolError;
use thiserror::Error;

/// Result alias used across the scanner.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors raised while talking to the device or writing results.
///
/// `Network` and `Correlation` are channel-local: the scanner records
/// the channel as failed and moves on.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Device unreachable, timed out, answered with an error status or
    /// sent a payload that could not be decoded.
    #[error("Network error: {0}")]
    Network(String),

    /// No tuner in the status snapshot reported the requested channel.
    #[error("No tuner reported channel {0}")]
    Correlation(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    pub fn network(msg: impl Into<String>) -> Self {
        ScanError::Network(msg.into())
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScanError::Network(format!("timed out: {}", e))
        } else if e.is_connect() {
            ScanError::Network(format!("connection failed: {}", e))
        } else {
            ScanError::Network(e.to_string())
        }
    }
}

impl From<ProtocolError> for ScanError {
    fn from(e: ProtocolError) -> Self {
        ScanError::Network(e.to_string())
    }
}
