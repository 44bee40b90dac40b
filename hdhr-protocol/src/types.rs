//! Payload and measurement types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of `/lineup.json`.
///
/// Only the fields needed for tuning are decoded; the device sends
/// many more (`URL`, `HD`, `Favorite`, ...) which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineupEntry {
    /// Virtual channel number, e.g. "8.8".
    pub guide_number: String,
    /// Station call sign or network name.
    #[serde(default)]
    pub guide_name: String,
}

/// One tuner record of `/status.json`.
///
/// Idle tuners report only their `Resource`, and firmware versions differ
/// in what they put in the other fields. Decoding never rejects a record:
/// missing, `null` or oddly typed percentages read as 0, and a channel
/// number that is neither a string nor a number reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TunerStatus {
    /// Tuner resource name ("tuner0", "tuner1", ...).
    #[serde(default, deserialize_with = "lenient_text")]
    pub resource: Option<String>,
    /// Virtual channel the tuner is currently streaming, if any.
    #[serde(default, deserialize_with = "lenient_text")]
    pub vct_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub signal_strength_percent: i64,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub signal_quality_percent: i64,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub symbol_quality_percent: i64,
}

fn lenient_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let percent = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(percent.unwrap_or(0))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A receivable channel from the device lineup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Guide number, used both for tuning and for status correlation.
    pub id: String,
    /// Display name from the lineup.
    pub name: String,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<LineupEntry> for Channel {
    fn from(entry: LineupEntry) -> Self {
        Self {
            id: entry.guide_number,
            name: entry.guide_name,
        }
    }
}

/// Signal metrics measured for one channel.
///
/// Field names are part of the snapshot file format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSample {
    pub channel: String,
    pub name: String,
    pub signal_strength: u8,
    pub signal_quality: u8,
    pub symbol_quality: u8,
}

impl SignalSample {
    /// Build a sample from the status record correlated with `channel`.
    ///
    /// Percentages outside 0..=100 are clamped.
    pub fn from_status(channel: &Channel, status: &TunerStatus) -> Self {
        Self {
            channel: channel.id.clone(),
            name: channel.name.clone(),
            signal_strength: clamp_percent(status.signal_strength_percent),
            signal_quality: clamp_percent(status.signal_quality_percent),
            symbol_quality: clamp_percent(status.symbol_quality_percent),
        }
    }
}

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}
