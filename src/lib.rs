//! # turntable-motion
//!
//! Coordinated control of a dual-axis geared pan/tilt turntable with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Geared axes**: Angles in degrees at the output shaft, converted to
//!   driver pulses through the gearbox and the selected microstep resolution
//! - **Coordinated speed**: The tilt axis is scaled so both output shafts turn
//!   at the same angular rate
//! - **Shared microstep lines**: One MS1/MS2/MS3 set drives both drivers
//! - **Line protocol**: Single-character serial commands with one reply line
//!   each, never blocking on motion
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR/EN/MS lines, `DelayNs` for
//!   pulse timing
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use turntable_motion::{AccelStepper, MicrostepSelect, TurntableBuilder};
//!
//! let config = turntable_motion::load_config("turntable.toml")?;
//!
//! let mut engine = TurntableBuilder::new()
//!     .config(config)
//!     .pan_motion(AccelStepper::new(pan_step, pan_dir, delay, clock))
//!     .pan_enable(pan_en)
//!     .tilt_motion(AccelStepper::new(tilt_step, tilt_dir, delay, clock))
//!     .tilt_enable(tilt_en)
//!     .microstep_select(MicrostepSelect::new(ms1, ms2, ms3))
//!     .build_engine()?;
//!
//! println!("{}", engine.banner());
//! loop {
//!     if let Some(reply) = engine.tick(serial.next_line()) {
//!         serial.write_line(reply);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and [`StdClock`]
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade on hosted targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible in every module
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod motion;
pub mod protocol;

// Re-exports for ergonomic API
pub use axis::{
    Activity, AxisId, DualAxisController, GearedAxis, MicrostepLines, MicrostepOutcome,
    MicrostepSelect, TurntableBuilder,
};
pub use config::{validate_config, AxisConfig, MotionConfig, ProtocolConfig, TurntableConfig};
pub use error::{Error, Result};
pub use motion::{AccelStepper, Clock, Direction, MotionPrimitive};
pub use protocol::{Banner, Command, ProtocolEngine, Reply};

#[cfg(feature = "std")]
pub use motion::StdClock;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, Microsteps, Pulses};
