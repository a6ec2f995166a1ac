//! Deferred actions.
//!
//! Input routing produces these instead of acting directly; the event loop
//! posts them to the back of the event queue and the
//! [`NodeService`](super::service::NodeService) executes them when they
//! come around.  External adapters (the simulator console) may post them
//! as well.

use crate::device::render::Rgb;
use crate::reporter::{ReportKind, SinkRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// State Joining, mark the join app-initiated, ask the stack to join.
    StartJoin,

    /// Erase network credentials and restart.
    FactoryReset,

    /// Send one report to the current destination.
    Report { kind: ReportKind, attempt: u8 },

    /// Remote LED RGB command with random levels.
    RemoteRgbRandom,

    /// Local RGB pulse: levels, state LedRgb, indicator-off timer re-armed.
    IndicatorPulse { rgb: Rgb, off_after_ms: u32 },

    /// Restart the probe cycle now.
    ProbeNow,

    /// Send a data-sink command to the default group.
    SendSink(SinkRequest),

    /// Restore the default destination without telling anyone.
    LocalSinkRelease,

    /// Keep the node awake for another wake window.
    RestartWakeTimer,

    /// Enable or disable re-issuing failed app-initiated joins.
    SetJoinRetry(bool),
}

/// Actions produced by one input event.
pub type Actions = heapless::Vec<AppAction, 4>;
