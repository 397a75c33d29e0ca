//! Turntable configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use super::axis::AxisConfig;
use super::units::Microsteps;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct TurntableConfig {
    /// Pan (turntable) axis.
    #[serde(default = "AxisConfig::default_pan")]
    pub pan: AxisConfig,

    /// Tilt axis.
    #[serde(default = "AxisConfig::default_tilt")]
    pub tilt: AxisConfig,

    /// Speed and microstep settings applied at boot.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Command protocol settings.
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

/// Coordinated speed settings.
///
/// Speeds and accelerations are in pulses of the pan axis; the tilt axis is
/// scaled by the gear-ratio factor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Pan maximum speed at boot (pulses/s).
    pub initial_speed: f32,

    /// Pan acceleration at boot (pulses/s²).
    pub initial_acceleration: f32,

    /// Multiplier applied by the `+` command.
    pub speed_up_factor: f32,

    /// Multiplier applied by the `-` command.
    pub speed_down_factor: f32,

    /// Microstep resolution programmed at boot.
    pub microsteps: Microsteps,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            initial_speed: 150.0,
            initial_acceleration: 80.0,
            speed_up_factor: 1.10,
            speed_down_factor: 0.90,
            microsteps: Microsteps::SIXTEENTH,
        }
    }
}

/// Command protocol settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Version string reported by `V`.
    pub firmware_version: String<16>,

    /// Route a bare uppercase `X` to "stop both axes".
    ///
    /// Off by default: `X` is matched by the pan stop command first and only
    /// stops the pan axis.
    pub uppercase_x_stops_both: bool,
}

/// Version reported when none is configured.
pub const DEFAULT_FIRMWARE_VERSION: &str = "1.0.1";

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            firmware_version: String::try_from(DEFAULT_FIRMWARE_VERSION).unwrap_or_default(),
            uppercase_x_stops_both: false,
        }
    }
}

impl TurntableConfig {
    /// Tilt-to-pan speed factor that keeps output-shaft angular rates in step.
    pub fn speed_ratio(&self) -> f32 {
        self.tilt.gear_ratio / self.pan.gear_ratio
    }
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            pan: AxisConfig::default_pan(),
            tilt: AxisConfig::default_tilt(),
            motion: MotionConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}
