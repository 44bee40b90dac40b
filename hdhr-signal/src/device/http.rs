//! HTTP client for HDHomeRun-style devices.

use std::time::Duration;

use hdhr_protocol::{decode_lineup, decode_status, Channel, DeviceEndpoints, TunerStatus};
use log::{debug, trace};

use super::TunerDevice;
use crate::config::DeviceConfig;
use crate::error::{Result, ScanError};

/// An open `auto/v<channel>` stream holding one tuner.
///
/// Dropping the handle closes the connection, which also frees the tuner,
/// but the scanner always hands it to [`TunerDevice::release`] instead.
#[derive(Debug)]
pub struct StreamHandle {
    channel_id: String,
    response: reqwest::Response,
}

/// Device client over plain HTTP.
#[derive(Debug, Clone)]
pub struct HdhrClient {
    client: reqwest::Client,
    endpoints: DeviceEndpoints,
    read_timeout: Duration,
    prefix_read_bytes: usize,
}

impl HdhrClient {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoints: config.endpoints(),
            read_timeout: config.read_timeout,
            prefix_read_bytes: config.prefix_read_bytes,
        })
    }

    pub fn endpoints(&self) -> &DeviceEndpoints {
        &self.endpoints
    }

    /// Fetch a small JSON document in full.
    async fn get_document(&self, url: &str) -> Result<Vec<u8>> {
        trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.read_timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

impl TunerDevice for HdhrClient {
    type Handle = StreamHandle;

    async fn fetch_lineup(&self) -> Result<Vec<Channel>> {
        let body = self.get_document(&self.endpoints.lineup_url()).await?;
        let channels = decode_lineup(&body)?;
        debug!("Lineup from {}: {} channels", self.endpoints.host(), channels.len());
        Ok(channels)
    }

    async fn begin_tune(&self, channel_id: &str) -> Result<StreamHandle> {
        let url = self.endpoints.stream_url(channel_id);
        trace!("GET {} (stream)", url);

        // A request-level timeout would also cut the body stream, so only
        // the wait for response headers is bounded here.
        let response = tokio::time::timeout(self.read_timeout, self.client.get(&url).send())
            .await
            .map_err(|_| {
                ScanError::network(format!(
                    "timed out after {:?} opening stream for {}",
                    self.read_timeout, channel_id
                ))
            })??;

        // 503 means every tuner is busy.
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::network(format!(
                "device refused to tune {}: HTTP {}",
                channel_id, status
            )));
        }

        Ok(StreamHandle {
            channel_id: channel_id.to_string(),
            response,
        })
    }

    async fn fetch_status(&self) -> Result<Vec<TunerStatus>> {
        let body = self.get_document(&self.endpoints.status_url()).await?;
        Ok(decode_status(&body)?)
    }

    async fn release(&self, handle: StreamHandle) {
        let StreamHandle {
            channel_id,
            mut response,
        } = handle;

        // Some firmware only commits the tune once stream data has been
        // pulled, so drain a bounded prefix before hanging up.
        let limit = self.prefix_read_bytes;
        let drained = tokio::time::timeout(self.read_timeout, async {
            let mut read = 0usize;
            while read < limit {
                match response.chunk().await {
                    Ok(Some(chunk)) => read += chunk.len(),
                    Ok(None) | Err(_) => break,
                }
            }
            read
        })
        .await;

        match drained {
            Ok(read) => trace!("Read {} bytes from {} stream before close", read, channel_id),
            Err(_) => trace!("Prefix read on {} stream timed out", channel_id),
        }

        drop(response);
        debug!("Released tuner for {}", channel_id);
    }
}
