//! One geared stepper axis.
//!
//! Wraps a motion primitive with the gearbox mechanics, the microstep
//! resolution currently selected on the driver, and the driver's enable line.

use embedded_hal::digital::OutputPin;

use crate::config::units::{Degrees, Microsteps, Pulses};
use crate::config::AxisConfig;
use crate::error::{MotorError, Result};
use crate::motion::MotionPrimitive;

use super::microstep::{MicrostepLines, MicrostepOutcome};

/// A stepper axis behind a gearbox.
///
/// Generic over:
/// - `M`: Motion primitive driving the STEP/DIR lines
/// - `EN`: Driver enable line (active low)
///
/// Positions and targets are pulses in the microstep resolution in effect when
/// they were set; changing the resolution does not rescale them.
pub struct GearedAxis<M, EN>
where
    M: MotionPrimitive,
    EN: OutputPin,
{
    /// Axis name for logging/debugging.
    name: heapless::String<32>,

    motion: M,

    enable_pin: EN,

    /// Full steps per motor revolution.
    base_steps: u32,

    /// Output revolutions per motor revolution.
    gear_ratio: f32,

    microsteps: Microsteps,

    /// Last level written to the enable line.
    enabled: bool,
}

impl<M, EN> GearedAxis<M, EN>
where
    M: MotionPrimitive,
    EN: OutputPin,
{
    /// Create an axis. Lines are not touched until [`begin`](Self::begin).
    pub fn new(config: &AxisConfig, motion: M, enable_pin: EN) -> Self {
        Self {
            name: config.name.clone(),
            motion,
            enable_pin,
            base_steps: config.base_steps,
            gear_ratio: config.gear_ratio,
            microsteps: Microsteps::SIXTEENTH,
            enabled: false,
        }
    }

    /// Bring the driver to its boot state: disabled, 1/16 microstepping.
    pub fn begin<S: MicrostepLines>(&mut self, select: &mut S) -> Result<()> {
        self.disable()?;
        self.set_microstep_resolution(Microsteps::SIXTEENTH.value(), select)?;
        debug!("axis {} ready", self.name.as_str());
        Ok(())
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Set the maximum speed in pulses/s.
    pub fn set_max_speed(&mut self, speed: f32) {
        self.motion.set_max_speed(speed);
    }

    /// Maximum speed in pulses/s.
    pub fn max_speed(&self) -> f32 {
        self.motion.max_speed()
    }

    /// Set the acceleration in pulses/s².
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.motion.set_acceleration(acceleration);
    }

    /// Acceleration in pulses/s².
    pub fn acceleration(&self) -> f32 {
        self.motion.acceleration()
    }

    /// Set an absolute target. Does not block.
    pub fn move_to(&mut self, absolute: Pulses) {
        self.motion.move_to(absolute.value());
    }

    /// Set a target relative to the current position. Does not block.
    pub fn move_by(&mut self, relative: Pulses) {
        self.motion.move_by(relative.value());
    }

    /// Advance the motion primitive; must be polled every cycle.
    ///
    /// Returns `true` while motion is still in progress.
    pub fn run(&mut self) -> Result<bool> {
        self.motion.run()
    }

    /// Run to the target, blocking. Never used from the command path.
    pub fn run_to_position(&mut self) -> Result<()> {
        self.motion.run_to_position()
    }

    /// Request a decelerated stop. Completion shows up in later polls.
    pub fn stop(&mut self) {
        self.motion.stop();
    }

    /// Current position in pulses.
    pub fn current_position(&self) -> Pulses {
        Pulses(self.motion.current_position())
    }

    /// Redefine the origin without moving.
    pub fn set_current_position(&mut self, position: Pulses) {
        self.motion.set_current_position(position.value());
    }

    /// Pulses remaining to the target.
    pub fn distance_to_go(&self) -> Pulses {
        Pulses(self.motion.distance_to_go())
    }

    /// Current target in pulses.
    pub fn target_position(&self) -> Pulses {
        Pulses(self.motion.target_position())
    }

    /// Whether the motion primitive is moving or has a pending target.
    pub fn is_running(&self) -> bool {
        self.motion.is_running()
    }

    /// Power the driver stage (enable line low).
    ///
    /// Leaves the target untouched: a target set while disabled resumes
    /// stepping once enabled.
    pub fn enable(&mut self) -> Result<()> {
        self.enable_pin.set_low().map_err(|_| MotorError::PinError)?;
        if !self.enabled {
            debug!("axis {} driver on", self.name.as_str());
        }
        self.enabled = true;
        Ok(())
    }

    /// Release the driver stage (enable line high).
    pub fn disable(&mut self) -> Result<()> {
        self.enable_pin.set_high().map_err(|_| MotorError::PinError)?;
        if self.enabled {
            debug!("axis {} driver off", self.name.as_str());
        }
        self.enabled = false;
        Ok(())
    }

    /// Last state written to the enable line.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Select a microstep resolution on `select`.
    ///
    /// Values other than 1, 2, 4, 8 and 16 are ignored: nothing is written and
    /// the previous resolution is retained.
    pub fn set_microstep_resolution<S: MicrostepLines>(
        &mut self,
        resolution: u16,
        select: &mut S,
    ) -> Result<MicrostepOutcome> {
        match Microsteps::new(resolution) {
            Ok(microsteps) => {
                select.program(microsteps)?;
                self.adopt_microsteps(microsteps);
                Ok(MicrostepOutcome::Applied(microsteps))
            }
            Err(_) => {
                warn!("axis {} ignoring microstep value {}", self.name.as_str(), resolution);
                Ok(MicrostepOutcome::Ignored {
                    requested: resolution,
                    retained: self.microsteps,
                })
            }
        }
    }

    /// Record a resolution already programmed on the shared lines.
    pub(crate) fn adopt_microsteps(&mut self, microsteps: Microsteps) {
        self.microsteps = microsteps;
    }

    /// Microstep resolution in effect.
    #[inline]
    pub fn microstep_resolution(&self) -> Microsteps {
        self.microsteps
    }

    /// Output revolutions per motor revolution.
    #[inline]
    pub fn gear_ratio(&self) -> f32 {
        self.gear_ratio
    }

    /// Full steps per motor revolution.
    #[inline]
    pub fn base_steps_per_rotation(&self) -> u32 {
        self.base_steps
    }

    /// Full steps per output revolution, rounded to the nearest step.
    ///
    /// Independent of microstepping.
    pub fn output_steps_per_rotation(&self) -> i64 {
        libm::roundf(self.base_steps as f32 * self.gear_ratio) as i64
    }

    /// Driver pulses per output revolution at the current resolution.
    pub fn pulses_per_rotation(&self) -> i64 {
        self.output_steps_per_rotation() * i64::from(self.microsteps.value())
    }

    /// Output angle for a pulse count at the current resolution.
    pub fn pulses_to_degrees(&self, pulses: Pulses) -> Degrees {
        Degrees(pulses.value() as f32 * 360.0 / self.pulses_per_rotation() as f32)
    }

    /// Borrow the motion primitive.
    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// Release the motion primitive and the enable line.
    pub fn release(self) -> (M, EN) {
        (self.motion, self.enable_pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    /// Motion primitive that only records targets.
    #[derive(Default)]
    struct Recorder {
        position: i64,
        target: i64,
        max_speed: f32,
        acceleration: f32,
    }

    impl MotionPrimitive for Recorder {
        fn set_max_speed(&mut self, speed: f32) {
            self.max_speed = speed;
        }
        fn max_speed(&self) -> f32 {
            self.max_speed
        }
        fn set_acceleration(&mut self, acceleration: f32) {
            self.acceleration = acceleration;
        }
        fn acceleration(&self) -> f32 {
            self.acceleration
        }
        fn move_to(&mut self, absolute: i64) {
            self.target = absolute;
        }
        fn move_by(&mut self, relative: i64) {
            self.target = self.position + relative;
        }
        fn run(&mut self) -> Result<bool> {
            Ok(self.target != self.position)
        }
        fn run_to_position(&mut self) -> Result<()> {
            self.position = self.target;
            Ok(())
        }
        fn stop(&mut self) {
            self.target = self.position;
        }
        fn current_position(&self) -> i64 {
            self.position
        }
        fn set_current_position(&mut self, position: i64) {
            self.position = position;
            self.target = position;
        }
        fn distance_to_go(&self) -> i64 {
            self.target - self.position
        }
        fn target_position(&self) -> i64 {
            self.target
        }
        fn is_running(&self) -> bool {
            self.target != self.position
        }
    }

    struct NullLines;

    fn quiet_pin() -> PinMock {
        let none: [Transaction; 0] = [];
        PinMock::new(&none)
    }

    impl MicrostepLines for NullLines {
        fn program(&mut self, _resolution: Microsteps) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_enable_line_is_active_low() {
        let pin = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);
        let mut axis = GearedAxis::new(&AxisConfig::default_pan(), Recorder::default(), pin);

        axis.begin(&mut NullLines).unwrap();
        assert!(!axis.is_enabled());
        assert_eq!(axis.microstep_resolution(), Microsteps::SIXTEENTH);

        axis.enable().unwrap();
        assert!(axis.is_enabled());
        axis.disable().unwrap();
        assert!(!axis.is_enabled());

        let (_, mut pin) = axis.release();
        pin.done();
    }

    #[test]
    fn test_disable_keeps_target() {
        let pin = PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let mut axis = GearedAxis::new(&AxisConfig::default_tilt(), Recorder::default(), pin);

        axis.enable().unwrap();
        axis.move_by(Pulses(500));
        axis.disable().unwrap();

        assert_eq!(axis.target_position(), Pulses(500));
        assert_eq!(axis.distance_to_go(), Pulses(500));

        let (_, mut pin) = axis.release();
        pin.done();
    }

    #[test]
    fn test_invalid_microstep_is_ignored() {
        let pin = quiet_pin();
        let mut axis = GearedAxis::new(&AxisConfig::default_pan(), Recorder::default(), pin);

        let outcome = axis.set_microstep_resolution(4, &mut NullLines).unwrap();
        assert_eq!(outcome, MicrostepOutcome::Applied(Microsteps::QUARTER));

        let outcome = axis.set_microstep_resolution(6, &mut NullLines).unwrap();
        assert_eq!(
            outcome,
            MicrostepOutcome::Ignored {
                requested: 6,
                retained: Microsteps::QUARTER
            }
        );
        assert_eq!(axis.microstep_resolution(), Microsteps::QUARTER);

        let (_, mut pin) = axis.release();
        pin.done();
    }

    #[test]
    fn test_output_steps_ignore_microstepping() {
        let pin = quiet_pin();
        let mut axis = GearedAxis::new(&AxisConfig::default_pan(), Recorder::default(), pin);

        for &v in &Microsteps::VALID_VALUES {
            axis.set_microstep_resolution(v, &mut NullLines).unwrap();
            assert_eq!(axis.output_steps_per_rotation(), 1134);
            assert_eq!(axis.pulses_per_rotation(), 1134 * i64::from(v));
        }

        let (_, mut pin) = axis.release();
        pin.done();
    }

    #[test]
    fn test_pulses_to_degrees() {
        let pin = quiet_pin();
        let mut axis = GearedAxis::new(&AxisConfig::default_tilt(), Recorder::default(), pin);

        // 4650 full steps per output revolution
        assert!((axis.pulses_to_degrees(Pulses(4650 * 16)).value() - 360.0).abs() < 1e-3);
        axis.set_microstep_resolution(1, &mut NullLines).unwrap();
        assert!((axis.pulses_to_degrees(Pulses(-2325)).value() + 180.0).abs() < 1e-3);

        let (_, mut pin) = axis.release();
        pin.done();
    }

    #[test]
    fn test_set_current_position_redefines_origin() {
        let pin = quiet_pin();
        let mut axis = GearedAxis::new(&AxisConfig::default_pan(), Recorder::default(), pin);

        axis.move_to(Pulses(42));
        axis.run_to_position().unwrap();
        axis.set_current_position(Pulses(0));

        assert_eq!(axis.current_position(), Pulses(0));
        assert!(!axis.is_running());

        let (_, mut pin) = axis.release();
        pin.done();
    }
}
