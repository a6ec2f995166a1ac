//! Device state manager.
//!
//! Owns the `{mode, state}` record of every stack instance and keeps the
//! LEDs consistent with it: every [`DeviceStateManager::set_state`] call
//! re-renders through [`render::render`] and hands the result to the LED
//! port.  Records are only reachable through the setters, never aliased.

pub mod render;

use log::debug;

use crate::app::ports::LedPort;
use crate::coap::grammar::LedRequest;
use render::{LedCommand, render};

/// Identifier of a logical stack instance.
pub type InstanceId = usize;

/// The single instance used by this deployment.
pub const DEFAULT_INSTANCE: InstanceId = 0;

/// Selects which input handler table is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceMode {
    Configuration,
    Application,
}

impl DeviceMode {
    pub const ALL: [Self; 2] = [Self::Configuration, Self::Application];
}

/// Descriptive device state; rendering is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    FactoryDefault,
    JoiningOrAttaching,
    NwkConnected,
    NwkFailure,
    LedOn,
    LedOff,
    LedToggle,
    LedFlash,
    LedRgb,
    LedColorWheel,
}

impl DeviceState {
    pub const ALL: [Self; 10] = [
        Self::FactoryDefault,
        Self::JoiningOrAttaching,
        Self::NwkConnected,
        Self::NwkFailure,
        Self::LedOn,
        Self::LedOff,
        Self::LedToggle,
        Self::LedFlash,
        Self::LedRgb,
        Self::LedColorWheel,
    ];
}

/// One instance's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRecord {
    pub mode: DeviceMode,
    pub state: DeviceState,
}

impl Default for DeviceRecord {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Configuration,
            state: DeviceState::FactoryDefault,
        }
    }
}

/// Fixed table of device records, one per instance.
pub struct DeviceStateManager<const N: usize = 1> {
    records: [DeviceRecord; N],
}

impl<const N: usize> Default for DeviceStateManager<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeviceStateManager<N> {
    pub fn new() -> Self {
        Self {
            records: [DeviceRecord::default(); N],
        }
    }

    /// Set the state and apply its LED rendering for the current mode.
    pub fn set_state(&mut self, instance: InstanceId, state: DeviceState, led: &mut impl LedPort) {
        let record = self.record_mut(instance);
        record.state = state;
        let command = render(record.mode, state);
        debug!("device[{}]: {:?}/{:?} -> {:?}", instance, record.mode, state, command);
        if command != LedCommand::Unchanged {
            led.apply(command);
        }
    }

    pub fn state(&self, instance: InstanceId) -> DeviceState {
        self.record(instance).state
    }

    /// Change the mode.  Does not re-render; the next `set_state` will.
    pub fn set_mode(&mut self, instance: InstanceId, mode: DeviceMode) {
        self.record_mut(instance).mode = mode;
    }

    pub fn mode(&self, instance: InstanceId) -> DeviceMode {
        self.record(instance).mode
    }

    /// Apply a parsed `/led` command: switch to Application mode and move to
    /// the matching LED state.  Boards without an RGB LED degrade RGB to
    /// on/off and the colour wheel to flash.
    pub fn apply_led_request(
        &mut self,
        instance: InstanceId,
        request: LedRequest,
        rgb_available: bool,
        led: &mut impl LedPort,
    ) {
        self.set_mode(instance, DeviceMode::Application);

        let state = match request {
            LedRequest::On => DeviceState::LedOn,
            LedRequest::Off => DeviceState::LedOff,
            LedRequest::Toggle => DeviceState::LedToggle,
            LedRequest::Flash => DeviceState::LedFlash,
            LedRequest::Rgb { r, g, b } if rgb_available => {
                led.set_rgb(r, g, b);
                DeviceState::LedRgb
            }
            LedRequest::Rgb { r, g, b } => {
                if r != 0 || g != 0 || b != 0 {
                    DeviceState::LedOn
                } else {
                    DeviceState::LedOff
                }
            }
            LedRequest::ColorWheel if rgb_available => DeviceState::LedColorWheel,
            LedRequest::ColorWheel => DeviceState::LedFlash,
        };
        self.set_state(instance, state, led);
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn record(&self, instance: InstanceId) -> &DeviceRecord {
        self.records
            .get(instance)
            .unwrap_or_else(|| panic!("invalid instance id {instance} (have {N})"))
    }

    fn record_mut(&mut self, instance: InstanceId) -> &mut DeviceRecord {
        self.records
            .get_mut(instance)
            .unwrap_or_else(|| panic!("invalid instance id {instance} (have {N})"))
    }
}
