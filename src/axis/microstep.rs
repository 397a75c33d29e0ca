//! Shared microstep select lines.
//!
//! Both drivers listen to the same three select lines, so the lines are a
//! single resource owned by the controller rather than by either axis.

use embedded_hal::digital::OutputPin;

use crate::config::units::Microsteps;
use crate::error::{MotorError, Result};

/// Result of a microstep change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrostepOutcome {
    /// The lines now select this resolution.
    Applied(Microsteps),
    /// The value was not a supported divisor; nothing was written.
    Ignored {
        /// Value that was asked for.
        requested: u16,
        /// Resolution still in effect.
        retained: Microsteps,
    },
}

impl MicrostepOutcome {
    /// Resolution in effect after the request.
    pub fn resolution(self) -> Microsteps {
        match self {
            MicrostepOutcome::Applied(ms) => ms,
            MicrostepOutcome::Ignored { retained, .. } => retained,
        }
    }

    /// Whether the request changed the select lines.
    pub fn is_applied(self) -> bool {
        matches!(self, MicrostepOutcome::Applied(_))
    }
}

/// Something that can program the driver's microstep resolution.
pub trait MicrostepLines {
    /// Drive the select lines for `resolution`.
    fn program(&mut self, resolution: Microsteps) -> Result<()>;
}

/// Three MS1/MS2/MS3 select lines (A4988 truth table).
pub struct MicrostepSelect<MS1, MS2, MS3>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    ms1: MS1,
    ms2: MS2,
    ms3: MS3,
}

impl<MS1, MS2, MS3> MicrostepSelect<MS1, MS2, MS3>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    /// Wrap the three select lines. Nothing is written until the first
    /// [`program`](MicrostepLines::program).
    pub fn new(ms1: MS1, ms2: MS2, ms3: MS3) -> Self {
        Self { ms1, ms2, ms3 }
    }

    /// Line levels `[MS1, MS2, MS3]` (true = high) for a resolution.
    pub fn pattern(resolution: Microsteps) -> [bool; 3] {
        match resolution.value() {
            1 => [false, false, false],
            2 => [true, false, false],
            4 => [false, true, false],
            8 => [true, true, false],
            _ => [true, true, true],
        }
    }

    /// Release the pins.
    pub fn release(self) -> (MS1, MS2, MS3) {
        (self.ms1, self.ms2, self.ms3)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
    if high {
        pin.set_high().map_err(|_| MotorError::PinError)?;
    } else {
        pin.set_low().map_err(|_| MotorError::PinError)?;
    }
    Ok(())
}

impl<MS1, MS2, MS3> MicrostepLines for MicrostepSelect<MS1, MS2, MS3>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    fn program(&mut self, resolution: Microsteps) -> Result<()> {
        let [ms1, ms2, ms3] = Self::pattern(resolution);
        drive(&mut self.ms1, ms1)?;
        drive(&mut self.ms2, ms2)?;
        drive(&mut self.ms3, ms3)?;
        trace!("microstep lines programmed for 1/{}", resolution.value());
        Ok(())
    }
}
