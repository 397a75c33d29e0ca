//! Coordinated pan/tilt controller.
//!
//! Owns both axes, the shared microstep select lines, and one jog direction per
//! axis. Speed changes always go to both axes, scaled so the two output shafts
//! keep a fixed angular speed ratio despite their different gearboxes.

use embedded_hal::digital::OutputPin;

use crate::config::units::{Degrees, Microsteps, Pulses};
use crate::config::MotionConfig;
use crate::error::{ProtocolError, Result};
use crate::motion::{Direction, MotionPrimitive};

use super::geared::GearedAxis;
use super::microstep::{MicrostepLines, MicrostepOutcome};

/// Largest relative move, in pulses, accepted from an angle.
pub const MAX_MOVE_PULSES: i64 = i32::MAX as i64;

/// Selects one of the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    /// Turntable axis.
    Pan,
    /// Tilt axis.
    Tilt,
}

/// Answer to a busy query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// At least one axis still has pulses to go.
    Busy,
    /// Both axes reached their targets; drivers have been released.
    Done,
}

/// Run `$body` with `$a` bound to the selected axis.
macro_rules! on_axis {
    ($self:ident, $axis:expr, $a:ident => $body:expr) => {
        match $axis {
            AxisId::Pan => {
                let $a = &mut $self.pan;
                $body
            }
            AxisId::Tilt => {
                let $a = &mut $self.tilt;
                $body
            }
        }
    };
}

/// Pan/tilt controller.
///
/// Generic over the pan motion primitive and enable line (`PM`, `PEN`), the
/// tilt ones (`TM`, `TEN`), and the shared microstep select lines (`SEL`).
pub struct DualAxisController<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    pan: GearedAxis<PM, PEN>,
    tilt: GearedAxis<TM, TEN>,
    select: SEL,

    pan_direction: Direction,
    tilt_direction: Direction,

    /// Tilt gear ratio over pan gear ratio, fixed at construction.
    speed_ratio: f32,

    /// Boot motion settings; speed adjusts scale the boot acceleration.
    motion: MotionConfig,
}

impl<PM, PEN, TM, TEN, SEL> DualAxisController<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    /// Create a controller. Lines are not touched until [`begin`](Self::begin).
    pub fn new(
        pan: GearedAxis<PM, PEN>,
        tilt: GearedAxis<TM, TEN>,
        select: SEL,
        motion: MotionConfig,
    ) -> Self {
        let speed_ratio = tilt.gear_ratio() / pan.gear_ratio();
        Self {
            pan,
            tilt,
            select,
            pan_direction: Direction::Clockwise,
            tilt_direction: Direction::Clockwise,
            speed_ratio,
            motion,
        }
    }

    /// Boot both axes: drivers off, configured microstepping, boot speed.
    pub fn begin(&mut self) -> Result<()> {
        self.pan.begin(&mut self.select)?;
        self.tilt.begin(&mut self.select)?;

        let boot = self.motion.microsteps;
        if boot != Microsteps::SIXTEENTH {
            self.set_microstep_resolution(boot.value())?;
        }

        self.set_coordinated_speed(self.motion.initial_speed, self.motion.initial_acceleration);
        info!(
            "turntable ready: pan {} steps/rev, tilt {} steps/rev, ratio {}",
            self.pan.output_steps_per_rotation(),
            self.tilt.output_steps_per_rotation(),
            self.speed_ratio
        );
        Ok(())
    }

    /// Pan axis.
    pub fn pan(&self) -> &GearedAxis<PM, PEN> {
        &self.pan
    }

    /// Pan axis, mutably.
    pub fn pan_mut(&mut self) -> &mut GearedAxis<PM, PEN> {
        &mut self.pan
    }

    /// Tilt axis.
    pub fn tilt(&self) -> &GearedAxis<TM, TEN> {
        &self.tilt
    }

    /// Tilt axis, mutably.
    pub fn tilt_mut(&mut self) -> &mut GearedAxis<TM, TEN> {
        &mut self.tilt
    }

    /// Boot motion settings.
    pub fn motion_config(&self) -> &MotionConfig {
        &self.motion
    }

    /// Tilt-to-pan speed factor.
    #[inline]
    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    /// Set pan speed and acceleration; tilt gets both scaled by the speed
    /// ratio.
    pub fn set_coordinated_speed(&mut self, speed: f32, acceleration: f32) {
        self.pan.set_max_speed(speed);
        self.pan.set_acceleration(acceleration);
        self.tilt.set_max_speed(speed * self.speed_ratio);
        self.tilt.set_acceleration(acceleration * self.speed_ratio);
        debug!("coordinated speed {} accel {}", speed, acceleration);
    }

    /// Multiply the current pan speed by `factor`, with acceleration set to
    /// the boot acceleration times `factor`.
    pub fn scale_speed(&mut self, factor: f32) {
        let speed = self.pan.max_speed() * factor;
        let acceleration = self.motion.initial_acceleration * factor;
        self.set_coordinated_speed(speed, acceleration);
    }

    /// Jog direction of an axis.
    pub fn direction(&self, axis: AxisId) -> Direction {
        match axis {
            AxisId::Pan => self.pan_direction,
            AxisId::Tilt => self.tilt_direction,
        }
    }

    /// Flip the jog direction of an axis. A move already underway is not
    /// affected.
    pub fn toggle_direction(&mut self, axis: AxisId) -> Direction {
        let slot = match axis {
            AxisId::Pan => &mut self.pan_direction,
            AxisId::Tilt => &mut self.tilt_direction,
        };
        *slot = slot.reversed();
        *slot
    }

    /// Convert an output angle to driver pulses at the axis' current
    /// resolution, rounded to the nearest pulse.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Syntax` if the angle is not finite or the result
    /// exceeds [`MAX_MOVE_PULSES`] in magnitude.
    pub fn degrees_to_pulses(&self, axis: AxisId, degrees: Degrees) -> Result<Pulses> {
        let per_rev = match axis {
            AxisId::Pan => self.pan.pulses_per_rotation(),
            AxisId::Tilt => self.tilt.pulses_per_rotation(),
        };
        let pulses = libm::roundf(degrees.revolutions() * per_rev as f32);
        if !pulses.is_finite() || libm::fabsf(pulses) > MAX_MOVE_PULSES as f32 {
            warn!("rejecting move of {} degrees", degrees.value());
            return Err(ProtocolError::Syntax.into());
        }
        Ok(Pulses(pulses as i64))
    }

    /// Current output angle of an axis, assuming every pulse so far was at the
    /// current resolution.
    pub fn position_degrees(&self, axis: AxisId) -> Degrees {
        match axis {
            AxisId::Pan => self.pan.pulses_to_degrees(self.pan.current_position()),
            AxisId::Tilt => self.tilt.pulses_to_degrees(self.tilt.current_position()),
        }
    }

    /// Enable both drivers and start a relative move on each axis.
    ///
    /// Returns as soon as the targets are set. Both angles are converted
    /// before anything is touched, so a rejected angle changes nothing.
    pub fn move_both_by_degrees(&mut self, pan: Degrees, tilt: Degrees) -> Result<()> {
        let pan_pulses = self.degrees_to_pulses(AxisId::Pan, pan)?;
        let tilt_pulses = self.degrees_to_pulses(AxisId::Tilt, tilt)?;

        self.enable_all()?;
        self.pan.move_by(pan_pulses);
        self.tilt.move_by(tilt_pulses);
        debug!("move pan {} tilt {} pulses", pan_pulses.value(), tilt_pulses.value());
        Ok(())
    }

    /// Report whether either axis still has pulses to go.
    ///
    /// When both are done, both drivers are disabled as part of the query.
    pub fn query_busy(&mut self) -> Result<Activity> {
        if self.pan.distance_to_go().value() != 0 || self.tilt.distance_to_go().value() != 0 {
            return Ok(Activity::Busy);
        }
        self.disable_all()?;
        Ok(Activity::Done)
    }

    /// Move one pulse in the axis' jog direction.
    pub fn step(&mut self, axis: AxisId) {
        let pulses = jog(self.direction(axis), Pulses(1));
        on_axis!(self, axis, a => a.move_by(pulses));
    }

    /// Move one full output revolution in the axis' jog direction.
    pub fn revolution(&mut self, axis: AxisId) {
        let direction = self.direction(axis);
        on_axis!(self, axis, a => {
            let pulses = jog(direction, Pulses(a.pulses_per_rotation()));
            a.move_by(pulses)
        });
    }

    /// Request a decelerated stop on one axis.
    pub fn stop(&mut self, axis: AxisId) {
        on_axis!(self, axis, a => a.stop());
    }

    /// Request a decelerated stop on both axes.
    pub fn stop_all(&mut self) {
        self.pan.stop();
        self.tilt.stop();
    }

    /// Enable both drivers.
    pub fn enable_all(&mut self) -> Result<()> {
        self.pan.enable()?;
        self.tilt.enable()
    }

    /// Disable both drivers. Targets are kept.
    pub fn disable_all(&mut self) -> Result<()> {
        self.pan.disable()?;
        self.tilt.disable()
    }

    /// Set the microstep resolution of both axes.
    ///
    /// The shared select lines are written once. Unsupported values are
    /// ignored and both axes keep their resolution.
    pub fn set_microstep_resolution(&mut self, resolution: u16) -> Result<MicrostepOutcome> {
        let Ok(microsteps) = Microsteps::new(resolution) else {
            warn!("ignoring microstep value {}", resolution);
            return Ok(MicrostepOutcome::Ignored {
                requested: resolution,
                retained: self.pan.microstep_resolution(),
            });
        };

        self.select.program(microsteps)?;
        self.pan.adopt_microsteps(microsteps);
        self.tilt.adopt_microsteps(microsteps);
        info!("microstepping 1/{}", resolution);
        Ok(MicrostepOutcome::Applied(microsteps))
    }

    /// Advance both axes by one scheduling step.
    ///
    /// Both axes are polled even if the first one fails; the first error is
    /// returned. `Ok(true)` while either axis is still moving.
    pub fn run(&mut self) -> Result<bool> {
        let pan = self.pan.run();
        let tilt = self.tilt.run();
        Ok(pan? | tilt?)
    }

    /// Whether either axis is moving or has a pending target.
    pub fn is_running(&self) -> bool {
        self.pan.is_running() || self.tilt.is_running()
    }

    /// Release both axes and the select lines.
    pub fn release(self) -> (GearedAxis<PM, PEN>, GearedAxis<TM, TEN>, SEL) {
        (self.pan, self.tilt, self.select)
    }
}

/// Orient a pulse count along a jog direction.
fn jog(direction: Direction, pulses: Pulses) -> Pulses {
    match direction {
        Direction::Clockwise => pulses,
        Direction::CounterClockwise => -pulses,
    }
}
