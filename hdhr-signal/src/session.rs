//! Single-channel tuning session.
//!
//! A session walks one channel through the tuner lifecycle:
//!
//! ```text
//! Idle ──begin_tune──▶ Tuning ──settle delay──▶ Locked ──fetch_status──┬─▶ Correlated
//!   │                                                                   └─▶ Uncorrelated
//!   └──────────────────────────── every path ─────────────────────────────▶ Released
//! ```
//!
//! Status must be read while the stream is still open: the device only
//! reports metrics for a tuner that is actively streaming, and once the
//! connection closes the tuner shows up as idle. Once `begin_tune` has
//! succeeded, the handle is released on every exit path before the
//! session returns.

use std::time::Duration;

use hdhr_protocol::{find_tuner_for, Channel, SignalSample};
use log::debug;

use crate::device::TunerDevice;
use crate::error::{Result, ScanError};

/// Lifecycle state of a [`TunerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing requested yet.
    Idle,
    /// Stream opened, tuner not yet trusted to be locked.
    Tuning,
    /// Settle delay elapsed.
    Locked,
    /// A tuner reported the requested channel.
    Correlated,
    /// No tuner reported the requested channel.
    Uncorrelated,
    /// Tuner handed back (or never obtained).
    Released,
}

/// What a finished session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Every state the session entered, starting with `Idle`.
    pub history: Vec<SessionState>,
    pub result: Result<SignalSample>,
}

impl SessionOutcome {
    pub fn final_state(&self) -> SessionState {
        self.history.last().copied().unwrap_or(SessionState::Idle)
    }

    /// Whether the session passed through `state`.
    pub fn reached(&self, state: SessionState) -> bool {
        self.history.contains(&state)
    }
}

/// Acquire/observe/release protocol for one channel.
pub struct TunerSession<'a, D: TunerDevice> {
    device: &'a D,
    channel: &'a Channel,
    settle_delay: Duration,
    history: Vec<SessionState>,
}

impl<'a, D: TunerDevice> TunerSession<'a, D> {
    pub fn new(device: &'a D, channel: &'a Channel, settle_delay: Duration) -> Self {
        Self {
            device,
            channel,
            settle_delay,
            history: vec![SessionState::Idle],
        }
    }

    pub fn state(&self) -> SessionState {
        self.history.last().copied().unwrap_or(SessionState::Idle)
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            "TunerSession[{}]: {:?} -> {:?}",
            self.channel.id,
            self.state(),
            next
        );
        self.history.push(next);
    }

    /// Run the session to completion.
    ///
    /// Consumes the session, so a channel cannot be tuned twice through
    /// the same instance.
    pub async fn run(mut self) -> SessionOutcome {
        let handle = match self.device.begin_tune(&self.channel.id).await {
            Ok(handle) => handle,
            Err(e) => {
                // No handle was issued, so there is nothing to give back.
                self.transition(SessionState::Released);
                return self.finish(Err(e));
            }
        };
        self.transition(SessionState::Tuning);

        let result = self.observe().await;

        self.device.release(handle).await;
        self.transition(SessionState::Released);

        self.finish(result)
    }

    /// Everything that happens while the handle is held. Must not return
    /// early past `run`'s release.
    async fn observe(&mut self) -> Result<SignalSample> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.transition(SessionState::Locked);

        let status = self.device.fetch_status().await?;

        match find_tuner_for(&status, &self.channel.id) {
            Some(tuner) => {
                self.transition(SessionState::Correlated);
                Ok(SignalSample::from_status(self.channel, tuner))
            }
            None => {
                self.transition(SessionState::Uncorrelated);
                Err(ScanError::Correlation(self.channel.id.clone()))
            }
        }
    }

    fn finish(self, result: Result<SignalSample>) -> SessionOutcome {
        SessionOutcome {
            history: self.history,
            result,
        }
    }
}
