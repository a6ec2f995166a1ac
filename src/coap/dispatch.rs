//! Inbound request handling, one handler per endpoint.
//!
//! Rules shared by every handler:
//!
//! - POST side effects run only for `SessionStatus::Success`; a `Duplicate`
//!   redelivery skips them.
//! - An acknowledgement goes back iff the request is confirmable and the
//!   status is not `Failure`.  GET acknowledgements carry the resource
//!   value; POST acknowledgements are empty.  `/counter` is the exception:
//!   it only logs and never replies.
//! - Empty payloads are valid input everywhere.

use core::fmt::Write as _;

use log::{debug, warn};

use super::grammar::{LedRequest, SinkCommand, parse_axis};
use super::{Endpoint, InboundRequest, Method, SessionStatus, Text};
use crate::app::ports::NodePorts;
use crate::config::NodeConfig;
use crate::destination::DestinationRegistry;
use crate::device::{DeviceStateManager, InstanceId};
use crate::error::Result;

/// Longest console line written by a handler.
pub const CONSOLE_LINE_MAX: usize = 128;

pub type ConsoleLine = heapless::String<CONSOLE_LINE_MAX>;

/// State the handlers are allowed to touch.
pub struct DispatchContext<'a> {
    pub instance: InstanceId,
    pub device: &'a mut DeviceStateManager,
    pub destination: &'a mut DestinationRegistry,
    pub config: &'a NodeConfig,
}

/// Register every served endpoint with the transport.
pub fn register_endpoints(hw: &mut impl NodePorts) -> Result<()> {
    for endpoint in Endpoint::ALL {
        hw.register(endpoint)?;
    }
    Ok(())
}

/// Handle one inbound request.
pub fn dispatch(request: &InboundRequest, ctx: &mut DispatchContext<'_>, hw: &mut impl NodePorts) {
    debug!(
        "{} {:?} {:?} from {} ({:?}, mid {})",
        request.endpoint.path(),
        request.method,
        request.status,
        request.remote,
        request.msg_type,
        request.message_id,
    );

    let reply = match request.endpoint {
        Endpoint::Led => handle_led(request, ctx, hw),
        Endpoint::SensorTemp => handle_sensor_temp(request, ctx, hw),
        Endpoint::Sink => handle_sink(request, ctx),
        Endpoint::Accel => handle_accel(request, ctx, hw),
        Endpoint::Counter => handle_counter(request, hw),
    };

    let replies = request.endpoint != Endpoint::Counter;
    if replies && request.is_confirmable() && request.status != SessionStatus::Failure {
        let payload = reply.as_ref().map_or(&[][..], |t| t.as_bytes());
        if let Err(e) = hw.acknowledge(request, payload) {
            warn!("{}: acknowledgement not sent: {}", request.endpoint.path(), e);
        }
    }
}

fn is_fresh_post(request: &InboundRequest) -> bool {
    request.method == Method::Post && request.status == SessionStatus::Success
}

// ── /led ──────────────────────────────────────────────────────

fn handle_led(
    request: &InboundRequest,
    ctx: &mut DispatchContext<'_>,
    hw: &mut impl NodePorts,
) -> Option<Text> {
    if !is_fresh_post(request) {
        return None;
    }
    match LedRequest::parse(request.text()) {
        Some(led) => {
            ctx.device
                .apply_led_request(ctx.instance, led, ctx.config.rgb_led, hw);
        }
        None => debug!("/led: unrecognised command ignored"),
    }
    None
}

// ── /sensor-temp ──────────────────────────────────────────────

fn handle_sensor_temp(
    request: &InboundRequest,
    ctx: &DispatchContext<'_>,
    hw: &mut impl NodePorts,
) -> Option<Text> {
    match request.method {
        Method::Get => Some(hw.temperature()),
        Method::Post => {
            if request.status == SessionStatus::Success {
                echo_remote_value(request, ctx.config.temp_echo_max, hw);
            }
            None
        }
    }
}

// ── /sink ─────────────────────────────────────────────────────

fn handle_sink(request: &InboundRequest, ctx: &mut DispatchContext<'_>) -> Option<Text> {
    if !is_fresh_post(request) {
        return None;
    }
    let command = SinkCommand::parse(request.text());
    if command.create {
        ctx.destination.set(request.remote);
    }
    if command.release {
        ctx.destination.reset();
    }
    None
}

// ── /accel ────────────────────────────────────────────────────

fn handle_accel(
    request: &InboundRequest,
    ctx: &DispatchContext<'_>,
    hw: &mut impl NodePorts,
) -> Option<Text> {
    match request.method {
        Method::Get => Some(hw.acceleration(parse_axis(request.text()))),
        Method::Post => {
            if request.status == SessionStatus::Success {
                echo_remote_value(request, ctx.config.accel_echo_max, hw);
            }
            None
        }
    }
}

// ── /counter ──────────────────────────────────────────────────

fn handle_counter(request: &InboundRequest, hw: &mut impl NodePorts) -> Option<Text> {
    if is_fresh_post(request) {
        let mut line = ConsoleLine::new();
        let _ = write!(
            line,
            "Counter {} From address: {}",
            truncate(request.text(), CONSOLE_LINE_MAX / 2),
            request.remote
        );
        hw.write_line(&line);
    }
    None
}

// ── Helpers ───────────────────────────────────────────────────

fn echo_remote_value(request: &InboundRequest, max_chars: usize, hw: &mut impl NodePorts) {
    let mut line = ConsoleLine::new();
    let _ = write!(
        line,
        "{}\tFrom address: {}",
        truncate(request.text(), max_chars),
        request.remote
    );
    hw.write_line(&line);
}

/// At most `max_chars` characters of `text`.
pub fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(i, _)| &text[..i])
}
