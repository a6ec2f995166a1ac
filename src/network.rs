//! Network lifecycle transitions.
//!
//! [`NetworkEventRouter::route`] maps one lifecycle event to an ordered list
//! of [`NetworkStep`]s; the service executes them against the device state,
//! the destination registry, the probe task and the ports.  The router
//! itself only owns the join-retry bookkeeping.
//!
//! | Event                                  | Steps                                               |
//! |----------------------------------------|-----------------------------------------------------|
//! | ResetToFactoryDefault                  | state FactoryDefault                                |
//! | InstanceRestoreStarted / ConnectingStarted | mode Configuration, state Joining, TX off       |
//! | JoinSucceeded                          | clear app-initiated flag                            |
//! | JoinFailed                             | re-join while app-initiated and retry allowed       |
//! | Connected                              | mode Application, state Connected, default dest, motion on, TX pulse, probe start |
//! | ConnectingFailed / Disconnected        | mode Configuration, state Failure, probe stop       |
//! | AllowSleep / DisallowSleep             | forwarded in low-power builds                       |
//! | CommissioningStarted / Failed          | state Joining / FactoryDefault                      |

use log::{debug, info};

use crate::device::{DeviceMode, DeviceState};

/// Lifecycle events surfaced by the mesh stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    ResetToFactoryDefault,
    InstanceRestoreStarted,
    ConnectingStarted,
    JoinSucceeded,
    JoinFailed,
    Connected,
    ConnectingFailed,
    Disconnected,
    AllowSleep,
    DisallowSleep,
    /// Secure joiner session started.
    CommissioningStarted,
    /// Joiner session or joiner error.
    CommissioningFailed,
}

/// One effect of a lifecycle transition, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStep {
    SetMode(DeviceMode),
    SetState(DeviceState),
    TxIndicator(bool),
    ResetDestination,
    EnableMotionDetection,
    StartProbe,
    StopProbe,
    Join,
    AllowSleep,
    DisallowSleep,
}

pub type Steps = heapless::Vec<NetworkStep, 8>;

/// Whether the current join was requested by the application, and whether
/// a failed one may be re-issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinRetryContext {
    pub app_initiated: bool,
    pub retry_allowed: bool,
}

impl Default for JoinRetryContext {
    fn default() -> Self {
        Self {
            app_initiated: false,
            retry_allowed: true,
        }
    }
}

pub struct NetworkEventRouter {
    join: JoinRetryContext,
    low_power: bool,
}

impl NetworkEventRouter {
    pub fn new(retry_allowed: bool, low_power: bool) -> Self {
        Self {
            join: JoinRetryContext {
                app_initiated: false,
                retry_allowed,
            },
            low_power,
        }
    }

    pub fn join_context(&self) -> JoinRetryContext {
        self.join
    }

    /// Mark the next join as application-initiated.
    pub fn begin_app_join(&mut self) {
        self.join.app_initiated = true;
    }

    pub fn set_retry_allowed(&mut self, allowed: bool) {
        self.join.retry_allowed = allowed;
    }

    /// Steps for one lifecycle event.
    pub fn route(&mut self, event: NetworkEvent) -> Steps {
        use NetworkStep as S;

        let steps: &[NetworkStep] = match event {
            NetworkEvent::ResetToFactoryDefault => &[S::SetState(DeviceState::FactoryDefault)],

            NetworkEvent::InstanceRestoreStarted | NetworkEvent::ConnectingStarted => &[
                S::SetMode(DeviceMode::Configuration),
                S::SetState(DeviceState::JoiningOrAttaching),
                S::TxIndicator(false),
            ],

            NetworkEvent::JoinSucceeded => {
                if self.join.app_initiated {
                    info!("join succeeded");
                }
                self.join.app_initiated = false;
                &[]
            }

            NetworkEvent::JoinFailed => {
                if !self.join.app_initiated {
                    &[]
                } else if self.join.retry_allowed {
                    info!("join failed, retrying");
                    &[S::Join]
                } else {
                    info!("join failed");
                    self.join.app_initiated = false;
                    &[]
                }
            }

            NetworkEvent::Connected => &[
                S::SetMode(DeviceMode::Application),
                S::SetState(DeviceState::NwkConnected),
                S::ResetDestination,
                S::EnableMotionDetection,
                S::TxIndicator(true),
                S::TxIndicator(false),
                S::StartProbe,
            ],

            NetworkEvent::ConnectingFailed | NetworkEvent::Disconnected => &[
                S::SetMode(DeviceMode::Configuration),
                S::SetState(DeviceState::NwkFailure),
                S::StopProbe,
            ],

            NetworkEvent::AllowSleep if self.low_power => &[S::AllowSleep],
            NetworkEvent::DisallowSleep if self.low_power => &[S::DisallowSleep],
            NetworkEvent::AllowSleep | NetworkEvent::DisallowSleep => &[],

            NetworkEvent::CommissioningStarted => &[S::SetState(DeviceState::JoiningOrAttaching)],
            NetworkEvent::CommissioningFailed => &[S::SetState(DeviceState::FactoryDefault)],
        };

        debug!("network {:?} -> {:?}", event, steps);
        // Longest row has 7 steps.
        Steps::from_slice(steps).unwrap_or_default()
    }
}
