//! Error types for decoding device responses.

use thiserror::Error;

/// Errors raised while decoding a device payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload was not valid JSON or did not have the expected shape.
    #[error("Failed to decode {endpoint}: {reason}")]
    Decode {
        endpoint: &'static str,
        reason: String,
    },
}

impl ProtocolError {
    pub(crate) fn decode(endpoint: &'static str, err: serde_json::Error) -> Self {
        ProtocolError::Decode {
            endpoint,
            reason: err.to_string(),
        }
    }
}
