//! Outbound reports.
//!
//! One message per report, sent to the registry's current destination:
//!
//! | Destination        | Delivery                                          |
//! |--------------------|---------------------------------------------------|
//! | this node          | nothing sent; rendered locally                    |
//! | multicast group    | non-confirmable POST; LED commands also run here  |
//! | unicast peer       | confirmable POST with completion tracking         |
//!
//! Data-sink commands bypass the registry and always go non-confirmable to
//! the default group.

use core::fmt::Write as _;
use core::net::Ipv6Addr;

use log::{info, warn};

use crate::app::ports::NodePorts;
use crate::coap::dispatch::ConsoleLine;
use crate::coap::grammar::LedRequest;
use crate::coap::{
    AxisSelect, Completion, Endpoint, MessageType, Method, OutboundMessage, Payload,
    SessionStatus, payload_from,
};
use crate::config::NodeConfig;
use crate::destination::{DEFAULT_DESTINATION, DestinationRegistry};
use crate::device::{DeviceStateManager, InstanceId};
use crate::error::TransportError;

/// What to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Temperature,
    Acceleration(AxisSelect),
    Counter(u32),
    Led(LedRequest),
}

impl ReportKind {
    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::Temperature => Endpoint::SensorTemp,
            Self::Acceleration(_) => Endpoint::Accel,
            Self::Counter(_) => Endpoint::Counter,
            Self::Led(_) => Endpoint::Led,
        }
    }
}

/// How a report left the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Destination is this node; handled without a message.
    Local,
    Sent(MessageType),
    /// The transport refused the session.
    Skipped(TransportError),
}

/// Data-sink command sent to the default group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkRequest {
    Create,
    Release,
}

impl SinkRequest {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Release => "release",
        }
    }
}

/// State a report may read or (for LED commands) mutate.
pub struct ReportContext<'a> {
    pub instance: InstanceId,
    pub device: &'a mut DeviceStateManager,
    pub destination: &'a DestinationRegistry,
    pub config: &'a NodeConfig,
}

/// Send one report toward the current destination.
pub fn report(
    kind: ReportKind,
    attempt: u8,
    ctx: &mut ReportContext<'_>,
    hw: &mut impl NodePorts,
) -> ReportOutcome {
    let target = ctx.destination.current();
    let payload = build_payload(kind, hw);

    if !matches!(kind, ReportKind::Led(_)) {
        echo(kind.endpoint(), &payload, target, hw);
    }

    if hw.is_own_address(&target) {
        if let ReportKind::Led(request) = kind {
            ctx.device
                .apply_led_request(ctx.instance, request, ctx.config.rgb_led, hw);
        }
        return ReportOutcome::Local;
    }

    let msg_type = if target.is_multicast() {
        MessageType::NonConfirmable
    } else {
        MessageType::Confirmable
    };

    let message = OutboundMessage {
        remote: target,
        msg_type,
        method: Method::Post,
        endpoint: kind.endpoint(),
        payload,
        attempt,
        notify_completion: msg_type == MessageType::Confirmable,
    };

    if let Err(e) = hw.send(message) {
        warn!("{}: report skipped: {}", kind.endpoint().path(), e);
        return ReportOutcome::Skipped(e);
    }

    if let (ReportKind::Led(request), MessageType::NonConfirmable) = (kind, msg_type) {
        ctx.device
            .apply_led_request(ctx.instance, request, ctx.config.rgb_led, hw);
    }
    ReportOutcome::Sent(msg_type)
}

/// Send a data-sink command to the default group.  On successful
/// submission `Create` points reports at this node and `Release` restores
/// the default destination.
pub fn send_sink_command(
    request: SinkRequest,
    destination: &mut DestinationRegistry,
    hw: &mut impl NodePorts,
) -> Result<(), TransportError> {
    let message = OutboundMessage {
        remote: DEFAULT_DESTINATION,
        msg_type: MessageType::NonConfirmable,
        method: Method::Post,
        endpoint: Endpoint::Sink,
        payload: payload_from(request.token()),
        attempt: 0,
        notify_completion: false,
    };
    hw.send(message)?;

    match request {
        SinkRequest::Create => destination.set(hw.mesh_local_address()),
        SinkRequest::Release => destination.reset(),
    }
    info!("/sink {} sent", request.token());
    Ok(())
}

/// The single built-in retry: a failed first temperature report is sent
/// once more with `attempt = 1`.
pub fn retry_for(completion: &Completion) -> Option<(ReportKind, u8)> {
    match completion {
        Completion {
            endpoint: Endpoint::SensorTemp,
            status: SessionStatus::Failure,
            attempt: 0,
        } => Some((ReportKind::Temperature, 1)),
        _ => None,
    }
}

fn build_payload(kind: ReportKind, hw: &mut impl NodePorts) -> Payload {
    match kind {
        ReportKind::Temperature => payload_from(&hw.temperature()),
        ReportKind::Acceleration(axis) => payload_from(&hw.acceleration(axis)),
        ReportKind::Counter(n) => {
            let mut text: heapless::String<12> = heapless::String::new();
            let _ = write!(text, "{}", n);
            payload_from(&text)
        }
        ReportKind::Led(request) => request.encode(),
    }
}

fn echo(endpoint: Endpoint, payload: &Payload, target: Ipv6Addr, hw: &mut impl NodePorts) {
    let text = core::str::from_utf8(payload).unwrap_or("");
    let mut line = ConsoleLine::new();
    let _ = write!(line, "{} {}\tTo address: {}", endpoint.path(), text, target);
    hw.write_line(&line);
}
