//! Node service: the hexagonal core.
//!
//! [`NodeService`] is the one explicitly owned context object: it holds the
//! device records, the destination, the join-retry bookkeeping, the timer
//! slots and the probe task, and routes each dequeued [`Event`] to the
//! component that handles it.  All I/O flows through port traits injected
//! at call sites.
//!
//! ```text
//!  Event ──▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!            │           NodeService             │
//!  ports ◀── │ device · destination · network    │ ──▶ Actions (deferred)
//!            │ dispatch · reporter · timers      │
//!            └──────────────────────────────────┘
//! ```

use core::net::Ipv6Addr;

use log::{debug, info, warn};

use crate::coap::dispatch::{self, DispatchContext};
use crate::coap::grammar::LedRequest;
use crate::coap::{Completion, SessionStatus};
use crate::config::NodeConfig;
use crate::destination::DestinationRegistry;
use crate::device::{DEFAULT_INSTANCE, DeviceMode, DeviceState, DeviceStateManager, InstanceId};
use crate::error::Result;
use crate::events::Event;
use crate::input::{self, RouteContext};
use crate::network::{JoinRetryContext, NetworkEventRouter, NetworkStep};
use crate::reporter::{self, ReportContext, ReportKind, ReportOutcome};
use crate::timers::{PollingTask, TimerAction, TimerOrchestrator, TimerSlot};

use super::actions::{Actions, AppAction};
use super::events::AppEvent;
use super::ports::{EventSink, NodePorts};

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    config: NodeConfig,
    instance: InstanceId,
    device: DeviceStateManager,
    destination: DestinationRegistry,
    network: NetworkEventRouter,
    timers: TimerOrchestrator,
    probe: PollingTask,
}

/// What the sink hears about after every event.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Observed {
    mode: DeviceMode,
    state: DeviceState,
    destination: Ipv6Addr,
}

impl NodeService {
    /// Construct the service.  Does **not** touch any port; call
    /// [`start`](Self::start) next.
    pub fn new(config: NodeConfig) -> Self {
        let network = NetworkEventRouter::new(config.join_retry_allowed, config.low_power);
        let probe = PollingTask::new(config.probe_interval_ms);
        Self {
            config,
            instance: DEFAULT_INSTANCE,
            device: DeviceStateManager::new(),
            destination: DestinationRegistry::new(),
            network,
            timers: TimerOrchestrator::new(),
            probe,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Register the endpoints, render the initial state and, when
    /// configured, ask the stack to join.
    pub fn start(&mut self, hw: &mut impl NodePorts, sink: &mut impl EventSink) -> Result<()> {
        dispatch::register_endpoints(hw)?;

        self.device
            .set_state(self.instance, DeviceState::FactoryDefault, hw);
        sink.emit(&AppEvent::Started {
            mode: self.mode(),
            state: self.state(),
        });
        info!("NodeService started in {:?}/{:?}", self.mode(), self.state());

        if self.config.auto_start && !hw.is_connected() {
            self.network.begin_app_join();
            self.request_join(hw, sink);
        }
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────

    /// Handle one event to completion.  Returns the deferred actions it
    /// produced; the caller posts them back to the queue.
    pub fn handle(
        &mut self,
        event: Event,
        hw: &mut impl NodePorts,
        sink: &mut impl EventSink,
    ) -> Actions {
        let before = self.observe();
        let mut deferred = Actions::new();

        match event {
            Event::Network(e) => {
                for step in self.network.route(e) {
                    self.apply_step(step, hw, sink);
                }
            }
            Event::Request(request) => {
                let mut ctx = DispatchContext {
                    instance: self.instance,
                    device: &mut self.device,
                    destination: &mut self.destination,
                    config: &self.config,
                };
                dispatch::dispatch(&request, &mut ctx, hw);
            }
            Event::Completion(completion) => self.on_completion(completion, hw, sink),
            Event::Input(input) => {
                let ctx = RouteContext {
                    state: self.state(),
                    config: &self.config,
                };
                deferred = input::route_input(self.mode(), input, &ctx);
            }
            Event::Motion(axis) => deferred = input::route_motion(axis, &self.config),
            Event::TimerExpired(token) => {
                if let Some(action) = self.timers.expire(token) {
                    self.on_timer(action, hw, sink);
                }
            }
            Event::Action(action) => self.execute(action, hw, sink),
        }

        self.emit_changes(before, sink);
        deferred
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn mode(&self) -> DeviceMode {
        self.device.mode(self.instance)
    }

    pub fn state(&self) -> DeviceState {
        self.device.state(self.instance)
    }

    pub fn destination(&self) -> Ipv6Addr {
        self.destination.current()
    }

    pub fn join_context(&self) -> JoinRetryContext {
        self.network.join_context()
    }

    pub fn is_timer_armed(&self, slot: TimerSlot) -> bool {
        self.timers.is_armed(slot)
    }

    pub fn is_probe_running(&self) -> bool {
        self.probe.is_running()
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_step(&mut self, step: NetworkStep, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        match step {
            NetworkStep::SetMode(mode) => self.device.set_mode(self.instance, mode),
            NetworkStep::SetState(state) => self.device.set_state(self.instance, state, hw),
            NetworkStep::TxIndicator(on) => hw.set_tx_activity_indicator(on),
            NetworkStep::ResetDestination => self.destination.reset(),
            NetworkStep::EnableMotionDetection => hw.enable_motion_detection(),
            NetworkStep::StartProbe => self.probe.start(&mut self.timers, hw),
            NetworkStep::StopProbe => self.probe.stop(&mut self.timers, hw),
            NetworkStep::Join => self.request_join(hw, sink),
            NetworkStep::AllowSleep => hw.allow_sleep(),
            NetworkStep::DisallowSleep => hw.disallow_sleep(),
        }
    }

    /// Whether `action` still applies to the current record.  Actions are
    /// decided when their input is handled but run later, after whatever
    /// was already queued.
    fn admits(&self, action: AppAction) -> bool {
        let application = self.mode() == DeviceMode::Application;
        match action {
            AppAction::StartJoin => {
                !application
                    && matches!(
                        self.state(),
                        DeviceState::FactoryDefault | DeviceState::NwkFailure
                    )
            }
            AppAction::FactoryReset | AppAction::SetJoinRetry(_) => true,
            AppAction::ProbeNow => application && self.probe.is_running(),
            AppAction::Report { .. }
            | AppAction::RemoteRgbRandom
            | AppAction::IndicatorPulse { .. }
            | AppAction::SendSink(_)
            | AppAction::LocalSinkRelease
            | AppAction::RestartWakeTimer => application,
        }
    }

    fn execute(&mut self, action: AppAction, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        if !self.admits(action) {
            debug!("action {:?} dropped in {:?}/{:?}", action, self.mode(), self.state());
            return;
        }
        debug!("action {:?}", action);
        match action {
            AppAction::StartJoin => {
                self.device
                    .set_state(self.instance, DeviceState::JoiningOrAttaching, hw);
                self.network.begin_app_join();
                self.request_join(hw, sink);
            }
            AppAction::FactoryReset => {
                info!("factory reset");
                hw.all_off();
                hw.factory_reset();
            }
            AppAction::Report { kind, attempt } => self.report(kind, attempt, hw, sink),
            AppAction::RemoteRgbRandom => {
                let request = LedRequest::Rgb {
                    r: hw.random_u8(1, 255),
                    g: hw.random_u8(1, 255),
                    b: hw.random_u8(1, 255),
                };
                self.report(ReportKind::Led(request), 0, hw, sink);
            }
            AppAction::IndicatorPulse { rgb, off_after_ms } => {
                self.timers.stop(TimerSlot::IndicatorOff, hw);
                hw.set_rgb(rgb.0, rgb.1, rgb.2);
                self.device.set_state(self.instance, DeviceState::LedRgb, hw);
                let _ = self.timers.arm(
                    TimerSlot::IndicatorOff,
                    off_after_ms,
                    TimerAction::IndicatorOff,
                    hw,
                );
            }
            AppAction::ProbeNow => self.probe.start(&mut self.timers, hw),
            AppAction::SendSink(request) => {
                if let Err(e) = reporter::send_sink_command(request, &mut self.destination, hw) {
                    warn!("/sink {}: not sent: {}", request.token(), e);
                }
            }
            AppAction::LocalSinkRelease => self.destination.reset(),
            AppAction::RestartWakeTimer => {
                hw.disallow_sleep();
                let _ = self.timers.arm(
                    TimerSlot::Wake,
                    self.config.wake_timeout_ms,
                    TimerAction::WakeExpired,
                    hw,
                );
            }
            AppAction::SetJoinRetry(allowed) => self.network.set_retry_allowed(allowed),
        }
    }

    fn on_timer(&mut self, action: TimerAction, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        match action {
            TimerAction::ProbeTick => {
                if let Some(count) = self.probe.on_tick(&mut self.timers, hw) {
                    self.report(ReportKind::Counter(count), 0, hw, sink);
                }
            }
            TimerAction::IndicatorOff => hw.all_off(),
            TimerAction::WakeExpired => hw.allow_sleep(),
        }
    }

    fn on_completion(&mut self, completion: Completion, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        match completion.status {
            SessionStatus::Success | SessionStatus::Duplicate => {
                debug!("{} acknowledged", completion.endpoint.path());
            }
            SessionStatus::Failure => match reporter::retry_for(&completion) {
                Some((kind, attempt)) => {
                    sink.emit(&AppEvent::ReportRetried(completion.endpoint));
                    self.report(kind, attempt, hw, sink);
                }
                None => warn!(
                    "{}: no acknowledgement (attempt {})",
                    completion.endpoint.path(),
                    completion.attempt
                ),
            },
        }
    }

    fn report(&mut self, kind: ReportKind, attempt: u8, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        let mut ctx = ReportContext {
            instance: self.instance,
            device: &mut self.device,
            destination: &self.destination,
            config: &self.config,
        };
        match reporter::report(kind, attempt, &mut ctx, hw) {
            ReportOutcome::Sent(msg_type) => sink.emit(&AppEvent::ReportSent {
                endpoint: kind.endpoint(),
                msg_type,
            }),
            ReportOutcome::Local => debug!("{} rendered locally", kind.endpoint().path()),
            ReportOutcome::Skipped(_) => {}
        }
    }

    fn request_join(&mut self, hw: &mut impl NodePorts, sink: &mut impl EventSink) {
        match hw.join(self.config.join_discovery) {
            Ok(()) => sink.emit(&AppEvent::JoinRequested {
                app_initiated: self.network.join_context().app_initiated,
            }),
            Err(e) => warn!("join not started: {}", e),
        }
    }

    fn observe(&self) -> Observed {
        Observed {
            mode: self.mode(),
            state: self.state(),
            destination: self.destination.current(),
        }
    }

    fn emit_changes(&self, before: Observed, sink: &mut impl EventSink) {
        let after = self.observe();
        if after == before {
            return;
        }
        if after.mode != before.mode {
            sink.emit(&AppEvent::ModeChanged {
                from: before.mode,
                to: after.mode,
            });
        }
        if after.state != before.state {
            sink.emit(&AppEvent::StateChanged {
                from: before.state,
                to: after.state,
            });
        }
        if after.destination != before.destination {
            sink.emit(&AppEvent::DestinationChanged(after.destination));
        }
    }
}
