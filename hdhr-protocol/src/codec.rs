//! Endpoint naming and JSON decoding for the device API.

use crate::error::ProtocolError;
use crate::types::{Channel, LineupEntry, TunerStatus};

/// Port serving `lineup.json` and `status.json`.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Port serving the `auto/v<channel>` streams.
pub const DEFAULT_STREAM_PORT: u16 = 5004;

/// URLs of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    host: String,
    http_port: u16,
    stream_port: u16,
}

impl DeviceEndpoints {
    pub fn new(host: impl Into<String>, http_port: u16, stream_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
            stream_port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn base(&self, port: u16) -> String {
        if port == DEFAULT_HTTP_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, port)
        }
    }

    /// `GET` target for the channel lineup.
    pub fn lineup_url(&self) -> String {
        format!("{}/lineup.json", self.base(self.http_port))
    }

    /// `GET` target for the tuner status list.
    pub fn status_url(&self) -> String {
        format!("{}/status.json", self.base(self.http_port))
    }

    /// `GET` target whose open connection keeps a tuner on `channel_id`.
    pub fn stream_url(&self, channel_id: &str) -> String {
        format!("{}/auto/v{}", self.base(self.stream_port), channel_id)
    }
}

/// Decode a `lineup.json` body into channels, preserving device order.
pub fn decode_lineup(body: &[u8]) -> Result<Vec<Channel>, ProtocolError> {
    let entries: Vec<LineupEntry> =
        serde_json::from_slice(body).map_err(|e| ProtocolError::decode("lineup.json", e))?;
    Ok(entries.into_iter().map(Channel::from).collect())
}

/// Decode a `status.json` body.
pub fn decode_status(body: &[u8]) -> Result<Vec<TunerStatus>, ProtocolError> {
    serde_json::from_slice(body).map_err(|e| ProtocolError::decode("status.json", e))
}

/// First tuner whose active channel is `channel_id`.
pub fn find_tuner_for<'a>(status: &'a [TunerStatus], channel_id: &str) -> Option<&'a TunerStatus> {
    status
        .iter()
        .find(|tuner| tuner.vct_number.as_deref() == Some(channel_id))
}
