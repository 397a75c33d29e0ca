//! Axis module for turntable-motion.
//!
//! Provides the geared axis wrapper, the shared microstep select lines and the
//! coordinated pan/tilt controller.

mod builder;
mod controller;
mod geared;
mod microstep;

pub use builder::TurntableBuilder;
pub use controller::{Activity, AxisId, DualAxisController, MAX_MOVE_PULSES};
pub use geared::GearedAxis;
pub use microstep::{MicrostepLines, MicrostepOutcome, MicrostepSelect};
