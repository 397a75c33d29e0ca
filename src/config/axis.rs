//! Per-axis mechanical configuration from TOML.

use heapless::String;
use serde::Deserialize;

/// Mechanical description of one geared axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Full (non-micro) steps per motor-shaft revolution.
    #[serde(rename = "base_steps_per_revolution")]
    pub base_steps: u32,

    /// Output-shaft revolutions per motor revolution, as the gearbox is labelled
    /// (e.g. 11.335 for an 11.335:1 reduction).
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio: f32,
}

fn default_gear_ratio() -> f32 {
    1.0
}

/// Full steps per motor revolution on the reference hardware.
pub const DEFAULT_BASE_STEPS: u32 = 100;

/// Turntable (pan) gearbox on the reference hardware.
pub const DEFAULT_PAN_GEAR_RATIO: f32 = 11.335;

/// Tilt gearbox on the reference hardware: a 6.2:1 stage into a 7.5:1 stage.
pub const DEFAULT_TILT_GEAR_RATIO: f32 = 6.2 * 7.5;

impl AxisConfig {
    /// Create an axis configuration.
    pub fn new(name: &str, base_steps: u32, gear_ratio: f32) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            base_steps,
            gear_ratio,
        }
    }

    /// Reference pan axis.
    pub fn default_pan() -> Self {
        Self::new("pan", DEFAULT_BASE_STEPS, DEFAULT_PAN_GEAR_RATIO)
    }

    /// Reference tilt axis.
    pub fn default_tilt() -> Self {
        Self::new("tilt", DEFAULT_BASE_STEPS, DEFAULT_TILT_GEAR_RATIO)
    }

    /// Full steps per output revolution, rounded to the nearest step.
    ///
    /// Independent of microstepping.
    pub fn output_steps_per_revolution(&self) -> i64 {
        libm::roundf(self.base_steps as f32 * self.gear_ratio) as i64
    }
}
