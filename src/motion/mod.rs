//! Motion module for turntable-motion.
//!
//! Defines the non-blocking motion primitive the axes are built on, and a
//! trapezoidal step/direction implementation of it.

mod clock;
mod direction;
mod stepper;

pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use direction::Direction;
pub use stepper::AccelStepper;

use crate::error::Result;

/// A non-blocking trapezoidal motion generator for one motor.
///
/// Positions are signed pulse counts relative to an arbitrary origin; speeds
/// are pulses/s and accelerations pulses/s². Targets only advance while
/// [`run`](MotionPrimitive::run) is polled.
pub trait MotionPrimitive {
    /// Set the maximum speed. No validation is applied.
    fn set_max_speed(&mut self, speed: f32);

    /// Get the maximum speed.
    fn max_speed(&self) -> f32;

    /// Set the acceleration and deceleration rate. No validation is applied.
    fn set_acceleration(&mut self, acceleration: f32);

    /// Get the acceleration rate.
    fn acceleration(&self) -> f32;

    /// Set an absolute target position.
    fn move_to(&mut self, absolute: i64);

    /// Set a target relative to the current position.
    fn move_by(&mut self, relative: i64);

    /// Step if one is due.
    ///
    /// Returns `true` while motion is still in progress.
    fn run(&mut self) -> Result<bool>;

    /// Block until the target is reached.
    ///
    /// Starves every other motor polled from the same loop while it runs.
    fn run_to_position(&mut self) -> Result<()>;

    /// Move the target so the motor decelerates to a stop at the current
    /// acceleration.
    fn stop(&mut self);

    /// Position in pulses.
    fn current_position(&self) -> i64;

    /// Redefine the current position without moving. Cancels any motion.
    fn set_current_position(&mut self, position: i64);

    /// Signed pulses from the current position to the target.
    fn distance_to_go(&self) -> i64;

    /// Most recently set target.
    fn target_position(&self) -> i64;

    /// Whether the motor is moving or has a pending target.
    fn is_running(&self) -> bool;
}
