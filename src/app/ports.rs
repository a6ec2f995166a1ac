//! Port traits: the hexagonal boundary between the application core and
//! the collaborators around it.
//!
//! ```text
//!   Collaborator adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! The mesh stack, the protocol transport, the LED/sensor/timer drivers and
//! the console all sit behind these traits.  [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the core never touches hardware and is
//! fully testable with a recording mock.
//!
//! All port errors are typed; callers degrade to a no-op and log.

use core::net::Ipv6Addr;

use crate::coap::{AxisSelect, Endpoint, InboundRequest, OutboundMessage, Text};
use crate::config::DiscoveryMethod;
use crate::device::render::LedCommand;
use crate::error::{NetworkError, TimerError, TransportError};
use crate::timers::{TimerSlot, TimerToken};

// ───────────────────────────────────────────────────────────────
// LED port (domain → LED driver)
// ───────────────────────────────────────────────────────────────

pub trait LedPort {
    /// Show a rendered command.  Never called with `LedCommand::Unchanged`.
    fn apply(&mut self, command: LedCommand);

    /// Load RGB levels for the next `LedCommand::Rgb`.
    fn set_rgb(&mut self, r: u8, g: u8, b: u8);

    /// Turn every LED off.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Network port (domain ↔ mesh stack)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort {
    /// Ask the stack to join, using the given discovery method.
    fn join(&mut self, discovery: DiscoveryMethod) -> Result<(), NetworkError>;

    /// Erase network credentials and restart the stack.
    fn factory_reset(&mut self);

    fn is_connected(&self) -> bool;

    /// This node's mesh-local endpoint identifier address.
    fn mesh_local_address(&self) -> Ipv6Addr;

    /// Whether `addr` is one of this node's own unicast addresses.
    fn is_own_address(&self, addr: &Ipv6Addr) -> bool {
        *addr == self.mesh_local_address()
    }

    /// Radio TX activity indicator.
    fn set_tx_activity_indicator(&mut self, on: bool);

    /// Uniform random value in `min..=max`.
    fn random_u8(&mut self, min: u8, max: u8) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Protocol port (domain ↔ CoAP-like transport)
// ───────────────────────────────────────────────────────────────

pub trait CoapPort {
    /// Register a served resource.  Called once per endpoint at start.
    fn register(&mut self, endpoint: Endpoint) -> Result<(), TransportError>;

    /// Open a session and send.  The transport owns the message afterwards.
    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError>;

    /// Send the acknowledgement for `request`, optionally carrying a payload.
    fn acknowledge(&mut self, request: &InboundRequest, payload: &[u8])
    -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Latest temperature reading, as text.
    fn temperature(&mut self) -> Text;

    /// Latest acceleration for the selected axis (or axes), as text.
    fn acceleration(&mut self, axis: AxisSelect) -> Text;

    /// Arm the motion-sensor interrupt.
    fn enable_motion_detection(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Console port
// ───────────────────────────────────────────────────────────────

pub trait ConsolePort {
    fn write_line(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Power port (low-power builds)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    fn allow_sleep(&mut self);
    fn disallow_sleep(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Timer port (domain → single-shot timer driver)
// ───────────────────────────────────────────────────────────────

/// Single-shot timer driver.  On expiry the driver posts
/// `Event::TimerExpired(token)` with the token it was started with.
pub trait TimerPort {
    /// Start (or restart) the hardware timer behind `token.slot`.
    fn start(&mut self, token: TimerToken, interval_ms: u32) -> Result<(), TimerError>;

    fn stop(&mut self, slot: TimerSlot);
}

// ───────────────────────────────────────────────────────────────
// Bundle
// ───────────────────────────────────────────────────────────────

/// Everything the node drives.  Implemented automatically for any type
/// implementing all the individual ports.
pub trait NodePorts:
    LedPort + NetworkPort + CoapPort + SensorPort + ConsolePort + PowerPort + TimerPort
{
}

impl<T> NodePorts for T where
    T: LedPort + NetworkPort + CoapPort + SensorPort + ConsolePort + PowerPort + TimerPort
{
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
