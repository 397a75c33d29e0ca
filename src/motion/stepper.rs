//! Non-blocking trapezoidal step generator.
//!
//! Generic over embedded-hal 1.0 pin types. Each call to [`AccelStepper::run`]
//! emits at most one step, and only when one is due, so the caller can poll
//! several generators from a single loop.
//!
//! Step intervals follow David Austin's recursive approximation of constant
//! acceleration ("Generate stepper-motor speed profiles in real time", 2005),
//! with the first interval corrected by 0.676 as in his equation 15.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use libm::{fabsf, sqrtf};

use crate::error::{MotorError, Result};

use super::clock::Clock;
use super::direction::Direction;
use super::MotionPrimitive;

/// STEP pulse width in microseconds.
const DEFAULT_PULSE_WIDTH_US: u32 = 2;

/// Trapezoidal step/direction generator.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
/// - `CLK`: Time source (must implement [`Clock`])
pub struct AccelStepper<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,
    clock: CLK,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
    pulse_width_us: u32,

    current_position: i64,
    target_position: i64,

    /// Signed speed in pulses/s.
    speed: f32,
    max_speed: f32,
    acceleration: f32,

    /// Interval to the next step in µs; zero when stopped.
    step_interval_us: u64,
    last_step_us: u64,

    /// Step counter on the ramp: positive while accelerating, negative while
    /// decelerating.
    n: i64,
    /// First step interval (µs).
    c0: f32,
    /// Current step interval (µs).
    cn: f32,
    /// Interval at max speed (µs).
    cmin: f32,
    direction: Direction,
}

impl<STEP, DIR, DELAY, CLK> AccelStepper<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// Create a stopped generator at position zero.
    ///
    /// Starts with a max speed of 1 pulse/s and an acceleration of
    /// 1 pulse/s²; callers are expected to set both.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY, clock: CLK) -> Self {
        let mut stepper = Self {
            step_pin,
            dir_pin,
            delay,
            clock,
            invert_direction: false,
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
            current_position: 0,
            target_position: 0,
            speed: 0.0,
            max_speed: 0.0,
            acceleration: 0.0,
            step_interval_us: 0,
            last_step_us: 0,
            n: 0,
            c0: 0.0,
            cn: 0.0,
            cmin: 1.0,
            direction: Direction::CounterClockwise,
        };
        stepper.set_max_speed(1.0);
        stepper.set_acceleration(1.0);
        stepper
    }

    /// Invert the DIR pin logic.
    pub fn with_inverted_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the STEP pulse width in microseconds.
    pub fn with_pulse_width_us(mut self, width: u32) -> Self {
        self.pulse_width_us = width;
        self
    }

    /// Current signed speed in pulses/s.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Release the pins, delay and clock.
    pub fn release(self) -> (STEP, DIR, DELAY, CLK) {
        (self.step_pin, self.dir_pin, self.delay, self.clock)
    }

    fn steps_to_stop(&self) -> i64 {
        ((self.speed * self.speed) / (2.0 * self.acceleration)) as i64
    }

    /// Recompute the interval to the next step from the ramp position.
    fn compute_new_speed(&mut self) {
        let distance_to = self.distance_to_go();
        let steps_to_stop = self.steps_to_stop();

        if distance_to == 0 && steps_to_stop <= 1 {
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance_to > 0 {
            if self.n > 0 {
                // Decelerate if we would overshoot or are heading the wrong way
                if steps_to_stop >= distance_to || self.direction == Direction::CounterClockwise {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < distance_to && self.direction == Direction::Clockwise
            {
                self.n = -self.n;
            }
        } else if distance_to < 0 {
            if self.n > 0 {
                if steps_to_stop >= distance_to.saturating_neg()
                    || self.direction == Direction::Clockwise
                {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < distance_to.saturating_neg()
                && self.direction == Direction::CounterClockwise
            {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from rest
            self.cn = self.c0;
            self.direction = if distance_to > 0 {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n + 1) as f32);
            self.cn = self.cn.max(self.cmin);
        }
        self.n += 1;
        self.step_interval_us = self.cn as u64;
        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::CounterClockwise {
            self.speed = -self.speed;
        }
    }

    /// Step once if the current interval has elapsed.
    fn run_speed(&mut self) -> Result<bool> {
        if self.step_interval_us == 0 {
            return Ok(false);
        }

        let now = self.clock.now_us();
        if now.wrapping_sub(self.last_step_us) < self.step_interval_us {
            return Ok(false);
        }

        self.pulse()?;
        self.current_position += self.direction.sign();
        self.last_step_us = now;
        Ok(true)
    }

    fn pulse(&mut self) -> Result<()> {
        let dir_high = match self.direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };
        if dir_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }
}

impl<STEP, DIR, DELAY, CLK> MotionPrimitive for AccelStepper<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    fn set_max_speed(&mut self, speed: f32) {
        let speed = fabsf(speed);
        if self.max_speed != speed {
            self.max_speed = speed;
            self.cmin = 1_000_000.0 / speed;
            // Re-plan the ramp if we are accelerating
            if self.n > 0 {
                self.n = self.steps_to_stop();
                self.compute_new_speed();
            }
        }
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn set_acceleration(&mut self, acceleration: f32) {
        if acceleration == 0.0 {
            return;
        }
        let acceleration = fabsf(acceleration);
        if self.acceleration != acceleration {
            // Keep the ramp position proportional to the new rate
            if self.acceleration > 0.0 {
                self.n = (self.n as f32 * (self.acceleration / acceleration)) as i64;
            }
            self.c0 = 0.676 * sqrtf(2.0 / acceleration) * 1_000_000.0;
            self.acceleration = acceleration;
            self.compute_new_speed();
        }
    }

    fn acceleration(&self) -> f32 {
        self.acceleration
    }

    fn move_to(&mut self, absolute: i64) {
        if self.target_position != absolute {
            self.target_position = absolute;
            self.compute_new_speed();
        }
    }

    fn move_by(&mut self, relative: i64) {
        self.move_to(self.current_position.saturating_add(relative));
    }

    fn run(&mut self) -> Result<bool> {
        if self.run_speed()? {
            self.compute_new_speed();
        }
        Ok(self.speed != 0.0 || self.distance_to_go() != 0)
    }

    fn run_to_position(&mut self) -> Result<()> {
        while self.run()? {}
        Ok(())
    }

    fn stop(&mut self) {
        if self.speed != 0.0 {
            let steps_to_stop = self.steps_to_stop() + 1;
            if self.speed > 0.0 {
                self.move_by(steps_to_stop);
            } else {
                self.move_by(-steps_to_stop);
            }
        }
    }

    fn current_position(&self) -> i64 {
        self.current_position
    }

    fn set_current_position(&mut self, position: i64) {
        self.current_position = position;
        self.target_position = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    fn distance_to_go(&self) -> i64 {
        self.target_position.saturating_sub(self.current_position)
    }

    fn target_position(&self) -> i64 {
        self.target_position
    }

    fn is_running(&self) -> bool {
        !(self.speed == 0.0 && self.target_position == self.current_position)
    }
}
