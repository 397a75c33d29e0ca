//! Configuration module for turntable-motion.
//!
//! Provides types for loading and validating the axis mechanics, boot motion
//! settings and protocol options from TOML files (with `std` feature) or
//! pre-parsed data.

mod axis;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{
    AxisConfig, DEFAULT_BASE_STEPS, DEFAULT_PAN_GEAR_RATIO, DEFAULT_TILT_GEAR_RATIO,
};
pub use system::{MotionConfig, ProtocolConfig, TurntableConfig, DEFAULT_FIRMWARE_VERSION};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, Microsteps, Pulses};
