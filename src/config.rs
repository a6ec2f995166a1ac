//! Node configuration parameters
//!
//! All tunable parameters for the end-device application.  Defaults match
//! the shipped demo behaviour; the host simulator can override them from a
//! JSON file.

use serde::{Deserialize, Serialize};

use crate::coap::MAX_PAYLOAD;
use crate::error::{Error, Result};

/// How the mesh stack looks for a network to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryMethod {
    /// Active scan for MAC beacons.
    MacBeacon,
    /// Mesh-level discovery request/response.
    ThreadDiscovery,
}

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Joining ---
    /// Discovery method used for every join request, including retries.
    pub join_discovery: DiscoveryMethod,
    /// Re-issue the join when an app-initiated join fails.
    pub join_retry_allowed: bool,
    /// Issue a join at start-up when the stack is not already connected.
    pub auto_start: bool,

    // --- Power ---
    /// Forward sleep allow/disallow events and keep the node awake after input.
    pub low_power: bool,
    /// Stay-awake window after a button gesture (milliseconds).
    pub wake_timeout_ms: u32,

    // --- LEDs ---
    /// Board has an RGB LED (otherwise RGB commands map to on/off).
    pub rgb_led: bool,
    /// Colour of the local pulse on a primary short press.
    pub indicator_rgb: (u8, u8, u8),
    /// Indicator pulse length after a button press (milliseconds).
    pub indicator_off_ms: u32,
    /// Indicator pulse length after a motion interrupt (milliseconds).
    pub motion_indicator_off_ms: u32,

    // --- Reporting ---
    /// Probe cadence while connected (milliseconds).
    pub probe_interval_ms: u32,

    // --- Console ---
    /// Maximum characters echoed for a remote temperature value.
    pub temp_echo_max: usize,
    /// Maximum characters echoed for a remote accelerometer value.
    pub accel_echo_max: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Joining
            join_discovery: DiscoveryMethod::ThreadDiscovery,
            join_retry_allowed: true,
            auto_start: false,

            // Power
            low_power: false,
            wake_timeout_ms: 5000,

            // LEDs
            rgb_led: true,
            indicator_rgb: (255, 0, 255), // magenta
            indicator_off_ms: 70,
            motion_indicator_off_ms: 100,

            // Reporting
            probe_interval_ms: 1000,

            // Console
            temp_echo_max: 9,
            accel_echo_max: 32,
        }
    }
}

impl NodeConfig {
    /// Reject values that would stall timers or overrun payload buffers.
    pub fn validate(&self) -> Result<()> {
        if self.indicator_off_ms == 0 || self.motion_indicator_off_ms == 0 {
            return Err(Error::Config("indicator intervals must be non-zero"));
        }
        if self.probe_interval_ms == 0 {
            return Err(Error::Config("probe_interval_ms must be non-zero"));
        }
        if self.low_power && self.wake_timeout_ms == 0 {
            return Err(Error::Config("wake_timeout_ms must be non-zero in low-power mode"));
        }
        if self.temp_echo_max > MAX_PAYLOAD || self.accel_echo_max > MAX_PAYLOAD {
            return Err(Error::Config("echo limit exceeds payload capacity"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
