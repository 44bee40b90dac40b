//! Access to the tuner device.
//!
//! [`TunerDevice`] is the seam between the tuning protocol and the network:
//! [`HdhrClient`] talks HTTP to real hardware, tests substitute a scripted
//! fake that records every call.
//!
//! # Tuner ownership
//!
//! On these devices there is no explicit "allocate tuner" message. Opening
//! the stream URL for a channel makes the device dedicate a physical tuner
//! to it, and closing that connection frees the tuner again. The handle
//! returned by [`TunerDevice::begin_tune`] therefore *is* the tuner
//! reservation, and every handle must be passed to
//! [`TunerDevice::release`] exactly once. Release takes the handle by
//! value, so a second release of the same handle does not type-check.

mod http;

#[cfg(test)]
pub(crate) mod fake;

use hdhr_protocol::{Channel, TunerStatus};

use crate::error::Result;

pub use http::{HdhrClient, StreamHandle};

/// Operations exposed by a networked tuner.
#[allow(async_fn_in_trait)]
pub trait TunerDevice {
    /// Exclusive use of one physical tuner while held.
    type Handle;

    /// Channels the device can receive, in device order.
    async fn fetch_lineup(&self) -> Result<Vec<Channel>>;

    /// Start tuning `channel_id`. Returns as soon as the device accepted the
    /// request; signal lock is not confirmed.
    async fn begin_tune(&self, channel_id: &str) -> Result<Self::Handle>;

    /// Current status of every tuner.
    async fn fetch_status(&self) -> Result<Vec<TunerStatus>>;

    /// Give the tuner back. Best effort, never fails.
    async fn release(&self, handle: Self::Handle);
}
