//! Simulated board for the host build.
//!
//! [`SimBoard`] implements every port on top of the process: LED and
//! sensor state live in memory, console lines go to stdout, and the
//! behaviour of the mesh stack and the transport is faked by pushing the
//! events a real stack would produce onto an [`Outbox`]:
//!
//! - `join` → `ConnectingStarted`, `JoinSucceeded`, `Connected`
//! - confirmable `send` → `Completion { status: Success }`
//!
//! The simulator drains that outbox into the event queue from its own task,
//! so a full queue delays stack events instead of dropping them.  Timer
//! requests reach the async timer task through a second outbox.

use core::cell::RefCell;
use core::net::Ipv6Addr;
use std::collections::VecDeque;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::{
    CoapPort, ConsolePort, LedPort, NetworkPort, PowerPort, SensorPort, TimerPort,
};
use crate::coap::{
    AxisSelect, Completion, Endpoint, InboundRequest, MessageType, Method, OutboundMessage,
    SessionStatus, Text, payload_from,
};
use crate::config::DiscoveryMethod;
use crate::device::render::LedCommand;
use crate::error::{NetworkError, TimerError, TransportError};
use crate::events::{Event, EventQueue};
use crate::input::InputEvent;
use crate::network::NetworkEvent;
use crate::timers::{TimerSlot, TimerToken};

/// Address the simulated peer sends requests from.
pub const SIM_PEER: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x2);

/// This node's simulated mesh-local address.
pub const SIM_SELF: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x1);

pub type SimQueue = EventQueue<CriticalSectionRawMutex>;

// ── Outbox ────────────────────────────────────────────────────

/// Unbounded FIFO from the board to an async task.
///
/// `push` never fails; the consumer awaits [`wait`](Self::wait) and then
/// pops until empty.
pub struct Outbox<T> {
    items: Mutex<CriticalSectionRawMutex, RefCell<VecDeque<T>>>,
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl<T> Default for Outbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Outbox<T> {
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(RefCell::new(VecDeque::new())),
            ready: Signal::new(),
        }
    }

    pub fn push(&self, item: T) {
        self.items.lock(|items| items.borrow_mut().push_back(item));
        self.ready.signal(());
    }

    pub fn pop(&self) -> Option<T> {
        self.items.lock(|items| items.borrow_mut().pop_front())
    }

    pub fn len(&self) -> usize {
        self.items.lock(|items| items.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve once something was pushed since the last wait.
    pub async fn wait(&self) {
        self.ready.wait().await;
    }
}

// ── Timer bridge ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Start(TimerToken, u32),
    Stop(TimerSlot),
}

// ── Board ─────────────────────────────────────────────────────

pub struct SimBoard<'a> {
    stack: &'a Outbox<Event>,
    timers: &'a Outbox<TimerRequest>,
    connected: bool,
    rgb: (u8, u8, u8),
    rng: StdRng,
    temperature_centi: i32,
}

impl<'a> SimBoard<'a> {
    /// `stack` receives the events the fake mesh stack and transport
    /// produce; `timers` receives timer requests.  `seed` fixes the
    /// random colours and temperature drift.
    pub fn new(stack: &'a Outbox<Event>, timers: &'a Outbox<TimerRequest>, seed: u64) -> Self {
        Self {
            stack,
            timers,
            connected: false,
            rgb: (0, 0, 0),
            rng: StdRng::seed_from_u64(seed),
            temperature_centi: 2150,
        }
    }
}

impl LedPort for SimBoard<'_> {
    fn apply(&mut self, command: LedCommand) {
        match command {
            LedCommand::Rgb => info!("LED | rgb {:?}", self.rgb),
            other => info!("LED | {:?}", other),
        }
    }

    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.rgb = (r, g, b);
    }

    fn all_off(&mut self) {
        info!("LED | all off");
    }
}

impl NetworkPort for SimBoard<'_> {
    fn join(&mut self, discovery: DiscoveryMethod) -> Result<(), NetworkError> {
        if self.connected {
            return Err(NetworkError::JoinRejected);
        }
        info!("NWK | join ({:?})", discovery);
        self.connected = true;
        self.stack.push(Event::Network(NetworkEvent::ConnectingStarted));
        self.stack.push(Event::Network(NetworkEvent::JoinSucceeded));
        self.stack.push(Event::Network(NetworkEvent::Connected));
        Ok(())
    }

    fn factory_reset(&mut self) {
        info!("NWK | factory reset");
        self.connected = false;
        self.stack.push(Event::Network(NetworkEvent::ResetToFactoryDefault));
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn mesh_local_address(&self) -> Ipv6Addr {
        SIM_SELF
    }

    fn set_tx_activity_indicator(&mut self, on: bool) {
        log::debug!("NWK | tx indicator {}", if on { "on" } else { "off" });
    }

    fn random_u8(&mut self, min: u8, max: u8) -> u8 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

impl CoapPort for SimBoard<'_> {
    fn register(&mut self, endpoint: Endpoint) -> Result<(), TransportError> {
        info!("COAP | registered {}", endpoint.path());
        Ok(())
    }

    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError> {
        info!(
            "COAP | {:?} {} -> {} {:?}",
            message.msg_type,
            message.endpoint.path(),
            message.remote,
            core::str::from_utf8(&message.payload).unwrap_or("<binary>"),
        );
        if message.notify_completion {
            self.stack.push(Event::Completion(Completion {
                endpoint: message.endpoint,
                status: SessionStatus::Success,
                attempt: message.attempt,
            }));
        }
        Ok(())
    }

    fn acknowledge(
        &mut self,
        request: &InboundRequest,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        info!(
            "COAP | ack {} mid {} {:?}",
            request.endpoint.path(),
            request.message_id,
            core::str::from_utf8(payload).unwrap_or("<binary>"),
        );
        Ok(())
    }
}

impl SensorPort for SimBoard<'_> {
    fn temperature(&mut self) -> Text {
        self.temperature_centi += self.rng.gen_range(-10..=10);
        let mut text = Text::new();
        let t = self.temperature_centi;
        let _ = core::fmt::write(&mut text, format_args!("{}.{:02} C", t / 100, (t % 100).abs()));
        text
    }

    fn acceleration(&mut self, axis: AxisSelect) -> Text {
        let mut text = Text::new();
        let _ = match axis {
            AxisSelect::X => text.push_str("X:0.01g"),
            AxisSelect::Y => text.push_str("Y:-0.02g"),
            AxisSelect::Z => text.push_str("Z:1.00g"),
            AxisSelect::All => text.push_str("X:0.01g Y:-0.02g Z:1.00g"),
            AxisSelect::None => Ok(()),
        };
        text
    }

    fn enable_motion_detection(&mut self) {
        info!("SENSOR | motion detection on");
    }
}

impl ConsolePort for SimBoard<'_> {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

impl PowerPort for SimBoard<'_> {
    fn allow_sleep(&mut self) {
        info!("PWR | sleep allowed");
    }

    fn disallow_sleep(&mut self) {
        info!("PWR | sleep disallowed");
    }
}

impl TimerPort for SimBoard<'_> {
    fn start(&mut self, token: TimerToken, interval_ms: u32) -> Result<(), TimerError> {
        self.timers.push(TimerRequest::Start(token, interval_ms));
        Ok(())
    }

    fn stop(&mut self, slot: TimerSlot) {
        self.timers.push(TimerRequest::Stop(slot));
    }
}

// ── Console commands ──────────────────────────────────────────

/// Parse one console line into an event.
///
/// ```text
/// press <n> | long <n> | vlong <n>        button gestures
/// motion x|y|z                            motion interrupt
/// net <event>                             lifecycle event (e.g. `net disconnected`)
/// get <path> [payload]                    confirmable GET from the peer
/// post <path> [payload]                   confirmable POST from the peer
/// non <path> [payload]                    non-confirmable POST from the peer
/// dup <path> [payload]                    duplicate confirmable POST
/// nack <path> [attempt]                   failed completion for a sent report
/// retry on|off                            join retry policy
/// ```
pub fn parse_command(line: &str, message_id: u16) -> Option<Event> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim_start();

    match verb {
        "press" => Some(Event::Input(InputEvent::press(rest.parse().ok()?))),
        "long" => Some(Event::Input(InputEvent::long_press(rest.parse().ok()?))),
        "vlong" => Some(Event::Input(InputEvent::very_long_press(rest.parse().ok()?))),
        "motion" => Some(Event::Motion(match rest {
            "x" => AxisSelect::X,
            "y" => AxisSelect::Y,
            "z" => AxisSelect::Z,
            _ => return None,
        })),
        "net" => parse_network_event(rest).map(Event::Network),
        "get" | "post" | "non" | "dup" => {
            let (path, payload) = rest.split_once(' ').unwrap_or((rest, ""));
            let (method, msg_type, status) = match verb {
                "get" => (Method::Get, MessageType::Confirmable, SessionStatus::Success),
                "post" => (Method::Post, MessageType::Confirmable, SessionStatus::Success),
                "non" => (Method::Post, MessageType::NonConfirmable, SessionStatus::Success),
                _ => (Method::Post, MessageType::Confirmable, SessionStatus::Duplicate),
            };
            Some(Event::Request(InboundRequest {
                endpoint: Endpoint::from_path(path)?,
                method,
                msg_type,
                status,
                remote: SIM_PEER,
                message_id,
                payload: payload_from(payload),
            }))
        }
        "nack" => {
            let (path, attempt) = rest.split_once(' ').unwrap_or((rest, "0"));
            Some(Event::Completion(Completion {
                endpoint: Endpoint::from_path(path)?,
                status: SessionStatus::Failure,
                attempt: attempt.trim().parse().ok()?,
            }))
        }
        "retry" => match rest {
            "on" => Some(Event::Action(crate::app::actions::AppAction::SetJoinRetry(true))),
            "off" => Some(Event::Action(crate::app::actions::AppAction::SetJoinRetry(false))),
            _ => None,
        },
        _ => None,
    }
}

fn parse_network_event(name: &str) -> Option<NetworkEvent> {
    Some(match name {
        "reset" => NetworkEvent::ResetToFactoryDefault,
        "restore" => NetworkEvent::InstanceRestoreStarted,
        "connecting" => NetworkEvent::ConnectingStarted,
        "joined" => NetworkEvent::JoinSucceeded,
        "join-failed" => NetworkEvent::JoinFailed,
        "connected" => NetworkEvent::Connected,
        "connect-failed" => NetworkEvent::ConnectingFailed,
        "disconnected" => NetworkEvent::Disconnected,
        "sleep" => NetworkEvent::AllowSleep,
        "wake" => NetworkEvent::DisallowSleep,
        "commissioning" => NetworkEvent::CommissioningStarted,
        "commissioning-failed" => NetworkEvent::CommissioningFailed,
        _ => return None,
    })
}
