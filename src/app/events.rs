//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use core::net::Ipv6Addr;

use crate::coap::{Endpoint, MessageType};
use crate::device::{DeviceMode, DeviceState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial record).
    Started { mode: DeviceMode, state: DeviceState },

    /// The device state changed.
    StateChanged { from: DeviceState, to: DeviceState },

    /// The device mode changed.
    ModeChanged { from: DeviceMode, to: DeviceMode },

    /// Reports now go to a different address.
    DestinationChanged(Ipv6Addr),

    /// A join request was handed to the mesh stack.
    JoinRequested { app_initiated: bool },

    /// A report left the node.
    ReportSent { endpoint: Endpoint, msg_type: MessageType },

    /// A failed confirmable report is being sent once more.
    ReportRetried(Endpoint),
}
