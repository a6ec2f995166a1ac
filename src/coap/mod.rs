//! Application-protocol value objects.
//!
//! The transport (framing, retransmission, duplicate detection) lives in the
//! protocol collaborator behind [`CoapPort`](crate::app::ports::CoapPort).
//! This module only defines what crosses that boundary: the endpoints the
//! node serves, inbound requests, outbound messages and send completions.

pub mod dispatch;
pub mod grammar;

use core::net::Ipv6Addr;

/// Payload capacity for every message the node handles.
pub const MAX_PAYLOAD: usize = 64;

/// Fixed-capacity message payload.
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD>;

/// Fixed-capacity resource text (sensor readings).
pub type Text = heapless::String<MAX_PAYLOAD>;

/// Build a payload from text, truncating at capacity.
pub fn payload_from(text: &str) -> Payload {
    let bytes = text.as_bytes();
    let len = bytes.len().min(MAX_PAYLOAD);
    let mut payload = Payload::new();
    // Cannot fail: `len` is bounded by capacity.
    let _ = payload.extend_from_slice(&bytes[..len]);
    payload
}

// ── Endpoints ─────────────────────────────────────────────────

/// Resources served (and addressed) by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Led,
    SensorTemp,
    Sink,
    Accel,
    Counter,
}

impl Endpoint {
    pub const ALL: [Self; 5] = [
        Self::Led,
        Self::SensorTemp,
        Self::Sink,
        Self::Accel,
        Self::Counter,
    ];

    /// URI path of the resource.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Led => "/led",
            Self::SensorTemp => "/sensor-temp",
            Self::Sink => "/sink",
            Self::Accel => "/accel",
            Self::Counter => "/counter",
        }
    }

    /// Resolve a URI path, with or without the leading slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        Self::ALL
            .into_iter()
            .find(|e| &e.path()[1..] == trimmed)
    }
}

// ── Message attributes ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Requires an acknowledgement; the transport retransmits until acked.
    Confirmable,
    NonConfirmable,
}

/// Outcome reported by the transport alongside a request or completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Success,
    /// No acknowledgement arrived for a confirmable message.
    Failure,
    /// Redelivery of a request already handled.
    Duplicate,
}

/// Accelerometer axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSelect {
    None,
    X,
    Y,
    Z,
    All,
}

// ── Messages ──────────────────────────────────────────────────

/// A request delivered by the transport to one of the node's endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    pub msg_type: MessageType,
    pub status: SessionStatus,
    pub remote: Ipv6Addr,
    pub message_id: u16,
    pub payload: Payload,
}

impl InboundRequest {
    pub fn is_confirmable(&self) -> bool {
        self.msg_type == MessageType::Confirmable
    }

    /// Payload as text; non-UTF-8 payloads read as empty.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.payload).unwrap_or("")
    }
}

/// One outbound session, handed to the transport by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub remote: Ipv6Addr,
    pub msg_type: MessageType,
    pub method: Method,
    pub endpoint: Endpoint,
    pub payload: Payload,
    /// 0 for the first send, 1 for the single retry.
    pub attempt: u8,
    /// Ask the transport to post a [`Completion`] when the session ends.
    pub notify_completion: bool,
}

/// End of a tracked outbound session, routed back through the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub endpoint: Endpoint,
    pub status: SessionStatus,
    pub attempt: u8,
}
