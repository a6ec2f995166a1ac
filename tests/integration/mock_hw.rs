//! Mock board for integration tests.
//!
//! Implements every port and records each call so tests can assert on the
//! full command history without a mesh stack or real drivers.

use std::net::Ipv6Addr;

use meshnode::app::events::AppEvent;
use meshnode::app::ports::{
    CoapPort, ConsolePort, EventSink, LedPort, NetworkPort, PowerPort, SensorPort, TimerPort,
};
use meshnode::coap::{AxisSelect, Endpoint, InboundRequest, OutboundMessage, Text};
use meshnode::config::DiscoveryMethod;
use meshnode::device::render::LedCommand;
use meshnode::error::{NetworkError, TimerError, TransportError};
use meshnode::timers::{TimerSlot, TimerToken};

pub const OWN_ADDRESS: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x1);
pub const PEER: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x2);

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Led(LedCommand),
    SetRgb(u8, u8, u8),
    AllOff,
    Join(DiscoveryMethod),
    FactoryReset,
    TxIndicator(bool),
    Register(Endpoint),
    Send(OutboundMessage),
    Ack {
        endpoint: Endpoint,
        message_id: u16,
        payload: String,
    },
    EnableMotion,
    Console(String),
    AllowSleep,
    DisallowSleep,
    TimerStart(TimerToken, u32),
    TimerStop(TimerSlot),
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub calls: Vec<Call>,
    pub connected: bool,
    pub send_error: Option<TransportError>,
    pub random: u8,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            connected: false,
            send_error: None,
            random: 42,
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn sent(&self) -> Vec<&OutboundMessage> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Send(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn acks(&self) -> Vec<(Endpoint, u16, &str)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Ack {
                    endpoint,
                    message_id,
                    payload,
                } => Some((*endpoint, *message_id, payload.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn led_commands(&self) -> Vec<LedCommand> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Led(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn console(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Console(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn joins(&self) -> usize {
        self.count(|c| matches!(c, Call::Join(_)))
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Token of the most recent start of `slot`.
    pub fn last_timer(&self, slot: TimerSlot) -> Option<TimerToken> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::TimerStart(token, _) if token.slot == slot => Some(*token),
            _ => None,
        })
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPort for MockBoard {
    fn apply(&mut self, command: LedCommand) {
        self.calls.push(Call::Led(command));
    }

    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.calls.push(Call::SetRgb(r, g, b));
    }

    fn all_off(&mut self) {
        self.calls.push(Call::AllOff);
    }
}

impl NetworkPort for MockBoard {
    fn join(&mut self, discovery: DiscoveryMethod) -> Result<(), NetworkError> {
        self.calls.push(Call::Join(discovery));
        Ok(())
    }

    fn factory_reset(&mut self) {
        self.calls.push(Call::FactoryReset);
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn mesh_local_address(&self) -> Ipv6Addr {
        OWN_ADDRESS
    }

    fn set_tx_activity_indicator(&mut self, on: bool) {
        self.calls.push(Call::TxIndicator(on));
    }

    fn random_u8(&mut self, min: u8, max: u8) -> u8 {
        self.random.clamp(min, max)
    }
}

impl CoapPort for MockBoard {
    fn register(&mut self, endpoint: Endpoint) -> Result<(), TransportError> {
        self.calls.push(Call::Register(endpoint));
        Ok(())
    }

    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError> {
        if let Some(e) = self.send_error {
            return Err(e);
        }
        self.calls.push(Call::Send(message));
        Ok(())
    }

    fn acknowledge(
        &mut self,
        request: &InboundRequest,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.calls.push(Call::Ack {
            endpoint: request.endpoint,
            message_id: request.message_id,
            payload: String::from_utf8_lossy(payload).into_owned(),
        });
        Ok(())
    }
}

impl SensorPort for MockBoard {
    fn temperature(&mut self) -> Text {
        Text::try_from("21.50").unwrap()
    }

    fn acceleration(&mut self, axis: AxisSelect) -> Text {
        let text = match axis {
            AxisSelect::X => "X:0.10",
            AxisSelect::Y => "Y:0.20",
            AxisSelect::Z => "Z:0.98",
            AxisSelect::All => "X:0.10 Y:0.20 Z:0.98",
            AxisSelect::None => "",
        };
        Text::try_from(text).unwrap()
    }

    fn enable_motion_detection(&mut self) {
        self.calls.push(Call::EnableMotion);
    }
}

impl ConsolePort for MockBoard {
    fn write_line(&mut self, line: &str) {
        self.calls.push(Call::Console(line.to_owned()));
    }
}

impl PowerPort for MockBoard {
    fn allow_sleep(&mut self) {
        self.calls.push(Call::AllowSleep);
    }

    fn disallow_sleep(&mut self) {
        self.calls.push(Call::DisallowSleep);
    }
}

impl TimerPort for MockBoard {
    fn start(&mut self, token: TimerToken, interval_ms: u32) -> Result<(), TimerError> {
        self.calls.push(Call::TimerStart(token, interval_ms));
        Ok(())
    }

    fn stop(&mut self, slot: TimerSlot) {
        self.calls.push(Call::TimerStop(slot));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
