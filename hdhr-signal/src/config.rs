//! Runtime configuration.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults
//! 2. `hdhr-signal.toml` (or the file given with `--config`)
//! 3. command line flags (applied by `main`)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hdhr_protocol::{Channel, DeviceEndpoints, DEFAULT_HTTP_PORT, DEFAULT_STREAM_PORT};
use serde::Deserialize;

use crate::error::{Result, ScanError};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hdhr-signal.toml";

/// Device address used when nothing else is configured.
pub const DEFAULT_HOST: &str = "hdhomerun.local";

/// Channels scanned when the config does not name any.
pub const DEFAULT_CHANNELS: &[&str] = &["4.1", "5.1", "8.8", "11.1", "13.1", "21.1", "27.1", "33.1"];

/// Connection settings for one tuner device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub http_port: u16,
    pub stream_port: u16,
    pub connect_timeout: Duration,
    /// Upper bound for any single response (headers or body).
    pub read_timeout: Duration,
    /// Bytes read from a tuning stream before it is closed.
    pub prefix_read_bytes: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            stream_port: DEFAULT_STREAM_PORT,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            prefix_read_bytes: 1000,
        }
    }
}

impl DeviceConfig {
    pub fn endpoints(&self) -> DeviceEndpoints {
        DeviceEndpoints::new(self.host.clone(), self.http_port, self.stream_port)
    }
}

/// Allow-list of channels of interest, plus optional display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    allow: Vec<String>,
    names: BTreeMap<String, String>,
}

impl ChannelFilter {
    pub fn new<I, S>(allow: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow: allow.into_iter().map(Into::into).collect(),
            names: BTreeMap::new(),
        }
    }

    pub fn with_names(mut self, names: BTreeMap<String, String>) -> Self {
        self.names = names;
        self
    }

    /// Identifiers in the order they were configured.
    pub fn ids(&self) -> &[String] {
        &self.allow
    }

    /// An empty allow-list admits everything.
    pub fn allows(&self, id: &str) -> bool {
        self.allow.is_empty() || self.allow.iter().any(|a| a == id)
    }

    /// Keep the lineup channels that pass the filter, in lineup order.
    pub fn apply(&self, lineup: Vec<Channel>) -> Vec<Channel> {
        lineup.into_iter().filter(|ch| self.allows(&ch.id)).collect()
    }

    /// Short display name for `id`, falling back to the id itself.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }
}

/// Settings for a single scan pass.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub filter: ChannelFilter,
    /// Wait between opening a stream and trusting the status readout.
    pub settle_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            filter: ChannelFilter::new(DEFAULT_CHANNELS.iter().copied()),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

/// Settings for watch mode.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Pause between two passes.
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            retention_days: 7,
            level: None,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub scan: ScanConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    device: DeviceSection,
    #[serde(default)]
    scan: ScanSection,
    #[serde(default)]
    monitor: MonitorSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
struct DeviceSection {
    host: Option<String>,
    http_port: Option<u16>,
    stream_port: Option<u16>,
    prefix_read_bytes: Option<usize>,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ScanSection {
    channels: Option<Vec<String>>,
    #[serde(default)]
    names: BTreeMap<String, String>,
    settle_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct MonitorSection {
    interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingSection {
    log_dir: Option<String>,
    retention_days: Option<u64>,
    level: Option<String>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ScanError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Resolve against the built-in defaults.
    pub fn into_config(self) -> AppConfig {
        let defaults = AppConfig::default();

        let device = DeviceConfig {
            host: self.device.host.unwrap_or(defaults.device.host),
            http_port: self.device.http_port.unwrap_or(defaults.device.http_port),
            stream_port: self.device.stream_port.unwrap_or(defaults.device.stream_port),
            connect_timeout: self
                .device
                .connect_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.device.connect_timeout),
            read_timeout: self
                .device
                .read_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.device.read_timeout),
            prefix_read_bytes: self
                .device
                .prefix_read_bytes
                .unwrap_or(defaults.device.prefix_read_bytes),
        };

        let filter = match self.scan.channels {
            Some(channels) => ChannelFilter::new(channels),
            None => defaults.scan.filter,
        }
        .with_names(self.scan.names);

        let scan = ScanConfig {
            filter,
            settle_delay: self
                .scan
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan.settle_delay),
        };

        let monitor = MonitorConfig {
            interval: self
                .monitor
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.monitor.interval),
        };

        let logging = LoggingConfig {
            log_dir: self.logging.log_dir.map(PathBuf::from),
            retention_days: self
                .logging
                .retention_days
                .unwrap_or(defaults.logging.retention_days),
            level: self.logging.level,
        };

        AppConfig {
            device,
            scan,
            monitor,
            logging,
        }
    }
}

/// Load configuration: explicit path > auto-detect > defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    });

    match path {
        Some(path) => Ok(ConfigFile::load(&path)?.into_config()),
        None => Ok(AppConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.device.host, "hdhomerun.local");
        assert_eq!(config.device.stream_port, 5004);
        assert_eq!(config.scan.settle_delay, Duration::from_millis(1000));
        assert_eq!(config.monitor.interval, Duration::from_millis(2000));
        assert_eq!(config.scan.filter.ids().len(), DEFAULT_CHANNELS.len());
    }

    #[test]
    fn test_parse_full_file() {
        let file = ConfigFile::parse(
            r#"
            [device]
            host = "192.168.1.50"
            prefix_read_bytes = 188
            read_timeout_ms = 3000

            [scan]
            channels = ["5.1", "4.1"]
            settle_delay_ms = 500

            [scan.names]
            "4.1" = "FOX"

            [monitor]
            interval_ms = 750

            [logging]
            log_dir = "logs"
            level = "debug"
            "#,
        )
        .unwrap();
        let config = file.into_config();

        assert_eq!(config.device.host, "192.168.1.50");
        assert_eq!(config.device.http_port, 80);
        assert_eq!(config.device.prefix_read_bytes, 188);
        assert_eq!(config.device.read_timeout, Duration::from_secs(3));
        assert_eq!(config.device.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.scan.filter.ids(), ["5.1", "4.1"]);
        assert_eq!(config.scan.filter.label("4.1"), "FOX");
        assert_eq!(config.scan.filter.label("5.1"), "5.1");
        assert_eq!(config.scan.settle_delay, Duration::from_millis(500));
        assert_eq!(config.monitor.interval, Duration::from_millis(750));
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(config.logging.retention_days, 7);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_invalid_file() {
        let err = ConfigFile::parse("[scan]\nsettle_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_filter_keeps_lineup_order() {
        let filter = ChannelFilter::new(["13.1", "4.1"]);
        let lineup = vec![
            Channel::new("4.1", "FOX"),
            Channel::new("5.1", "KSL"),
            Channel::new("13.1", "KSTU"),
        ];

        let kept = filter.apply(lineup);
        assert_eq!(
            kept,
            vec![Channel::new("4.1", "FOX"), Channel::new("13.1", "KSTU")]
        );
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let filter = ChannelFilter::default();
        let lineup = vec![Channel::new("4.1", "FOX"), Channel::new("99.9", "X")];
        assert_eq!(filter.apply(lineup.clone()), lineup);
    }
}
