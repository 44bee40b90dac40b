//! Scripted in-memory device for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use hdhr_protocol::{Channel, TunerStatus};
use tokio_util::sync::CancellationToken;

use super::TunerDevice;
use crate::error::{Result, ScanError};

/// One call observed by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeviceEvent {
    Lineup,
    Begin(String),
    Status,
    Release(String),
}

#[derive(Debug)]
pub(crate) struct FakeHandle {
    channel_id: String,
}

enum StatusReply {
    Records(Vec<TunerStatus>),
    Error,
}

/// Fake tuner with a single physical tuner.
///
/// While a channel is tuned, `fetch_status` answers with whatever was
/// scripted for that channel, or with an idle tuner list if nothing was.
pub(crate) struct FakeDevice {
    lineup: Option<Vec<Channel>>,
    replies: HashMap<String, StatusReply>,
    refuse: HashSet<String>,
    cancel_after: Option<(usize, CancellationToken)>,
    tuned: Mutex<Option<String>>,
    lineups: Mutex<usize>,
    events: Mutex<Vec<DeviceEvent>>,
}

impl FakeDevice {
    pub(crate) fn new(lineup: Vec<Channel>) -> Self {
        Self {
            lineup: Some(lineup),
            replies: HashMap::new(),
            refuse: HashSet::new(),
            cancel_after: None,
            tuned: Mutex::new(None),
            lineups: Mutex::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Device whose lineup endpoint is unreachable.
    pub(crate) fn unreachable() -> Self {
        Self {
            lineup: None,
            ..Self::new(Vec::new())
        }
    }

    /// Report these metrics for `channel_id` while it is tuned.
    pub(crate) fn with_signal(self, channel_id: &str, strength: i64, quality: i64, symbol: i64) -> Self {
        let record = TunerStatus {
            resource: Some("tuner0".to_string()),
            vct_number: Some(channel_id.to_string()),
            signal_strength_percent: strength,
            signal_quality_percent: quality,
            symbol_quality_percent: symbol,
        };
        self.with_status(channel_id, vec![record, idle_tuner("tuner1")])
    }

    /// Raw status list returned while `channel_id` is tuned.
    pub(crate) fn with_status(mut self, channel_id: &str, records: Vec<TunerStatus>) -> Self {
        self.replies
            .insert(channel_id.to_string(), StatusReply::Records(records));
        self
    }

    /// Status fetch fails while `channel_id` is tuned.
    pub(crate) fn with_status_error(mut self, channel_id: &str) -> Self {
        self.replies.insert(channel_id.to_string(), StatusReply::Error);
        self
    }

    /// Tune requests for `channel_id` are rejected.
    pub(crate) fn refusing(mut self, channel_id: &str) -> Self {
        self.refuse.insert(channel_id.to_string());
        self
    }

    /// Cancel `token` while serving the `n`-th lineup request.
    pub(crate) fn cancel_after_lineups(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }

    pub(crate) fn events(&self) -> Vec<DeviceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn begin_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Begin(_)))
            .count()
    }

    pub(crate) fn release_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Release(_)))
            .count()
    }

    /// True while a handle is outstanding.
    pub(crate) fn is_tuned(&self) -> bool {
        self.tuned.lock().unwrap().is_some()
    }

    fn record(&self, event: DeviceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn idle_tuner(resource: &str) -> TunerStatus {
    TunerStatus {
        resource: Some(resource.to_string()),
        ..Default::default()
    }
}

impl TunerDevice for FakeDevice {
    type Handle = FakeHandle;

    async fn fetch_lineup(&self) -> Result<Vec<Channel>> {
        self.record(DeviceEvent::Lineup);

        let served = {
            let mut lineups = self.lineups.lock().unwrap();
            *lineups += 1;
            *lineups
        };
        if let Some((n, token)) = &self.cancel_after {
            if served >= *n {
                token.cancel();
            }
        }

        self.lineup
            .clone()
            .ok_or_else(|| ScanError::network("connection refused"))
    }

    async fn begin_tune(&self, channel_id: &str) -> Result<FakeHandle> {
        self.record(DeviceEvent::Begin(channel_id.to_string()));

        let mut tuned = self.tuned.lock().unwrap();
        assert!(
            tuned.is_none(),
            "tune of {} while {:?} still holds the tuner",
            channel_id,
            tuned
        );

        if self.refuse.contains(channel_id) {
            return Err(ScanError::network(format!(
                "device refused to tune {}: HTTP 503",
                channel_id
            )));
        }

        *tuned = Some(channel_id.to_string());
        Ok(FakeHandle {
            channel_id: channel_id.to_string(),
        })
    }

    async fn fetch_status(&self) -> Result<Vec<TunerStatus>> {
        self.record(DeviceEvent::Status);

        let tuned = self.tuned.lock().unwrap().clone();
        let reply = tuned.as_ref().and_then(|id| self.replies.get(id));
        match reply {
            Some(StatusReply::Records(records)) => Ok(records.clone()),
            Some(StatusReply::Error) => Err(ScanError::network("status.json timed out")),
            None => Ok(vec![idle_tuner("tuner0"), idle_tuner("tuner1")]),
        }
    }

    async fn release(&self, handle: FakeHandle) {
        self.record(DeviceEvent::Release(handle.channel_id.clone()));

        let mut tuned = self.tuned.lock().unwrap();
        assert_eq!(
            tuned.as_deref(),
            Some(handle.channel_id.as_str()),
            "release of a handle the device does not hold"
        );
        *tuned = None;
    }
}
