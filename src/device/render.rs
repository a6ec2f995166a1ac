//! Pure `(mode, state) -> LedCommand` rendering table.
//!
//! ```text
//!                 Configuration           Application
//!  FactoryDefault  idle pattern            unchanged
//!  Joining         attaching pattern       unchanged
//!  NwkFailure      failure pattern         unchanged
//!  NwkConnected    connected pattern       connected pattern
//!  Led*            unchanged               literal LED command
//! ```
//!
//! The table is a single exhaustive `match`, so adding a mode or state
//! without a rendering is a compile error.

use super::{DeviceMode, DeviceState};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Time-varying shape of a status pattern.  The LED driver owns the timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Solid,
    SlowPulse,
    FastBlink,
    Breathing,
    DoubleBlink,
    RapidFlash,
}

/// Command handed to the LED driver collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    /// Network-status indication.
    Pattern { colour: Rgb, pattern: PatternId },
    On,
    Off,
    Toggle,
    Flash,
    /// Show the RGB levels most recently pushed with `LedPort::set_rgb`.
    Rgb,
    ColorWheel,
    /// The mode's table has no rendering for this state; leave the LEDs alone.
    Unchanged,
}

// ── Status colours ────────────────────────────────────────────

pub const COLOUR_IDLE: Rgb = (255, 255, 255); // White
pub const COLOUR_ATTACHING: Rgb = (0, 100, 255); // Blue
pub const COLOUR_FAILURE: Rgb = (255, 0, 0); // Red
pub const COLOUR_CONNECTED: Rgb = (0, 255, 50); // Green

pub const PATTERN_IDLE: LedCommand = LedCommand::Pattern {
    colour: COLOUR_IDLE,
    pattern: PatternId::SlowPulse,
};
pub const PATTERN_ATTACHING: LedCommand = LedCommand::Pattern {
    colour: COLOUR_ATTACHING,
    pattern: PatternId::FastBlink,
};
pub const PATTERN_FAILURE: LedCommand = LedCommand::Pattern {
    colour: COLOUR_FAILURE,
    pattern: PatternId::DoubleBlink,
};
pub const PATTERN_CONNECTED: LedCommand = LedCommand::Pattern {
    colour: COLOUR_CONNECTED,
    pattern: PatternId::Solid,
};

/// Map a device record to the LED command that represents it.
pub const fn render(mode: DeviceMode, state: DeviceState) -> LedCommand {
    use DeviceMode::{Application, Configuration};
    use DeviceState as S;

    match (mode, state) {
        (Configuration, S::FactoryDefault) => PATTERN_IDLE,
        (Configuration, S::JoiningOrAttaching) => PATTERN_ATTACHING,
        (Configuration, S::NwkFailure) => PATTERN_FAILURE,
        (_, S::NwkConnected) => PATTERN_CONNECTED,
        (
            Configuration,
            S::LedOn | S::LedOff | S::LedToggle | S::LedFlash | S::LedRgb | S::LedColorWheel,
        ) => LedCommand::Unchanged,

        (Application, S::LedOn) => LedCommand::On,
        (Application, S::LedOff) => LedCommand::Off,
        (Application, S::LedToggle) => LedCommand::Toggle,
        (Application, S::LedFlash) => LedCommand::Flash,
        (Application, S::LedRgb) => LedCommand::Rgb,
        (Application, S::LedColorWheel) => LedCommand::ColorWheel,
        (Application, S::FactoryDefault | S::JoiningOrAttaching | S::NwkFailure) => {
            LedCommand::Unchanged
        }
    }
}
