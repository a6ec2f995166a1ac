//! Button gestures and motion interrupts → deferred actions.
//!
//! One handler table per [`DeviceMode`], indexed by the device's current
//! mode.  Handlers only decide; they return [`Actions`] and never touch
//! state.
//!
//! ```text
//!  Configuration          Application (button 0 = primary)
//!  ─────────────          ────────────────────────────────
//!  Press    → join*       Press 0 → accel report, RGB pulse, probe now
//!  Long     → –           Press 1 → temperature report
//!  VeryLong → reset       Press 2 → remote RGB (random)  Press 3 → remote RGB off
//!                         Long 0 → sink release  Long 1 → local release
//!                         Long 2 → remote flash  Long 3 → remote colour wheel
//!  * only from FactoryDefault or NwkFailure      VeryLong → reset
//! ```

use crate::app::actions::{AppAction, Actions};
use crate::coap::AxisSelect;
use crate::coap::grammar::LedRequest;
use crate::config::NodeConfig;
use crate::device::render::Rgb;
use crate::device::{DeviceMode, DeviceState};
use crate::reporter::{ReportKind, SinkRequest};

pub type ButtonId = u8;

pub const PRIMARY_BUTTON: ButtonId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Press,
    LongPress,
    VeryLongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub button: ButtonId,
    pub gesture: Gesture,
}

impl InputEvent {
    pub const fn press(button: ButtonId) -> Self {
        Self {
            button,
            gesture: Gesture::Press,
        }
    }

    pub const fn long_press(button: ButtonId) -> Self {
        Self {
            button,
            gesture: Gesture::LongPress,
        }
    }

    pub const fn very_long_press(button: ButtonId) -> Self {
        Self {
            button,
            gesture: Gesture::VeryLongPress,
        }
    }
}

/// Read-only view a handler decides on.
#[derive(Clone, Copy)]
pub struct RouteContext<'a> {
    pub state: DeviceState,
    pub config: &'a NodeConfig,
}

type InputHandler = fn(InputEvent, &RouteContext<'_>) -> Actions;

const HANDLERS: [InputHandler; 2] = [configuration_input, application_input];

const fn table_index(mode: DeviceMode) -> usize {
    match mode {
        DeviceMode::Configuration => 0,
        DeviceMode::Application => 1,
    }
}

/// Route a gesture through the active mode's table.
pub fn route_input(mode: DeviceMode, event: InputEvent, ctx: &RouteContext<'_>) -> Actions {
    HANDLERS[table_index(mode)](event, ctx)
}

fn actions(list: &[AppAction]) -> Actions {
    // Every handler row fits in capacity.
    Actions::from_slice(list).unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════
//  Configuration mode
// ═══════════════════════════════════════════════════════════════

fn configuration_input(event: InputEvent, ctx: &RouteContext<'_>) -> Actions {
    match event.gesture {
        Gesture::Press
            if matches!(
                ctx.state,
                DeviceState::FactoryDefault | DeviceState::NwkFailure
            ) =>
        {
            actions(&[AppAction::StartJoin])
        }
        Gesture::Press | Gesture::LongPress => Actions::new(),
        Gesture::VeryLongPress => actions(&[AppAction::FactoryReset]),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Application mode
// ═══════════════════════════════════════════════════════════════

fn application_input(event: InputEvent, ctx: &RouteContext<'_>) -> Actions {
    let mut out = Actions::new();
    if ctx.config.low_power {
        let _ = out.push(AppAction::RestartWakeTimer);
    }

    let report = |kind| AppAction::Report { kind, attempt: 0 };
    let remote_led = |request| report(ReportKind::Led(request));

    let row = match (event.gesture, event.button) {
        (Gesture::Press, 0) => actions(&[
            report(ReportKind::Acceleration(AxisSelect::All)),
            AppAction::IndicatorPulse {
                rgb: ctx.config.indicator_rgb,
                off_after_ms: ctx.config.indicator_off_ms,
            },
            AppAction::ProbeNow,
        ]),
        (Gesture::Press, 1) => actions(&[report(ReportKind::Temperature)]),
        (Gesture::Press, 2) => actions(&[AppAction::RemoteRgbRandom]),
        (Gesture::Press, 3) => actions(&[remote_led(LedRequest::Rgb { r: 0, g: 0, b: 0 })]),

        (Gesture::LongPress, 0) => actions(&[AppAction::SendSink(SinkRequest::Release)]),
        (Gesture::LongPress, 1) => actions(&[AppAction::LocalSinkRelease]),
        (Gesture::LongPress, 2) => actions(&[remote_led(LedRequest::Flash)]),
        (Gesture::LongPress, 3) => actions(&[remote_led(LedRequest::ColorWheel)]),

        (Gesture::VeryLongPress, _) => actions(&[AppAction::FactoryReset]),
        _ => Actions::new(),
    };
    for action in row {
        let _ = out.push(action);
    }
    out
}

// ═══════════════════════════════════════════════════════════════
//  Motion interrupt
// ═══════════════════════════════════════════════════════════════

/// Actions for a motion-sensor interrupt on `axis`: report that axis and
/// pulse red/green/blue for X/Y/Z.  Any other value pulses black without
/// reporting.
pub fn route_motion(axis: AxisSelect, config: &NodeConfig) -> Actions {
    let rgb: Rgb = match axis {
        AxisSelect::X => (255, 0, 0),
        AxisSelect::Y => (0, 255, 0),
        AxisSelect::Z => (0, 0, 255),
        AxisSelect::None | AxisSelect::All => (0, 0, 0),
    };

    let mut out = Actions::new();
    if matches!(axis, AxisSelect::X | AxisSelect::Y | AxisSelect::Z) {
        let _ = out.push(AppAction::Report {
            kind: ReportKind::Acceleration(axis),
            attempt: 0,
        });
    }
    let _ = out.push(AppAction::IndicatorPulse {
        rgb,
        off_after_ms: config.motion_indicator_off_ms,
    });
    out
}
