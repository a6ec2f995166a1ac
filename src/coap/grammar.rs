//! Text command grammars carried in endpoint payloads.
//!
//! Tokens are case-sensitive and matched as prefixes of the payload, in a
//! fixed order.  Anything unrecognised parses to `None` and the caller
//! leaves state alone.

use core::fmt::Write as _;

use super::{AxisSelect, Payload, payload_from};

/// Parsed `/led` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedRequest {
    On,
    Off,
    Toggle,
    Flash,
    Rgb { r: u8, g: u8, b: u8 },
    ColorWheel,
}

impl LedRequest {
    /// Parse an `/led` payload.
    ///
    /// `rgb` fields are read after their `r`/`g`/`b` markers: every leading
    /// decimal digit, truncated to the low byte (`300` reads as 44).  Missing
    /// fields read as 0.
    pub fn parse(text: &str) -> Option<Self> {
        if text.starts_with("on") {
            Some(Self::On)
        } else if text.starts_with("off") {
            Some(Self::Off)
        } else if text.starts_with("toggle") {
            Some(Self::Toggle)
        } else if text.starts_with("flash") {
            Some(Self::Flash)
        } else if let Some(fields) = text.strip_prefix("rgb") {
            Some(Self::Rgb {
                r: rgb_field(fields, 'r'),
                g: rgb_field(fields, 'g'),
                b: rgb_field(fields, 'b'),
            })
        } else if text.starts_with("color wheel") {
            Some(Self::ColorWheel)
        } else {
            None
        }
    }

    /// Wire form of the command, as sent to a remote `/led`.
    pub fn encode(self) -> Payload {
        let mut text: heapless::String<32> = heapless::String::new();
        let token = match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
            Self::Flash => "flash",
            Self::ColorWheel => "color wheel",
            Self::Rgb { r, g, b } => {
                // 18 chars, always fits.
                let _ = write!(text, "rgb r{:03} g{:03} b{:03}", r, g, b);
                return payload_from(&text);
            }
        };
        payload_from(token)
    }
}

fn rgb_field(fields: &str, marker: char) -> u8 {
    let Some(pos) = fields.find(marker) else {
        return 0;
    };
    let value = fields[pos + 1..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, d| acc.wrapping_mul(10).wrapping_add(u32::from(d - b'0')));
    value as u8
}

/// Parsed `/sink` command.  Both tokens may be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCommand {
    pub create: bool,
    pub release: bool,
}

impl SinkCommand {
    pub fn parse(text: &str) -> Self {
        Self {
            create: text.contains("create"),
            release: text.contains("release"),
        }
    }
}

/// Axis selector in an `/accel` GET payload.  First match wins.
pub fn parse_axis(text: &str) -> AxisSelect {
    if text.starts_with("xyz") || text.starts_with("all") {
        AxisSelect::All
    } else if text.starts_with('x') {
        AxisSelect::X
    } else if text.starts_with('y') {
        AxisSelect::Y
    } else if text.starts_with('z') {
        AxisSelect::Z
    } else {
        AxisSelect::None
    }
}
