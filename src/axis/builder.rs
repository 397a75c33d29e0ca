//! Builder pattern for DualAxisController.

use embedded_hal::digital::OutputPin;

use crate::config::{validate_config, TurntableConfig};
use crate::error::{ConfigError, Error, Result};
use crate::motion::MotionPrimitive;
use crate::protocol::ProtocolEngine;

use super::controller::DualAxisController;
use super::geared::GearedAxis;
use super::microstep::MicrostepLines;

/// Builder assembling a turntable from configuration and hardware.
pub struct TurntableBuilder<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    config: TurntableConfig,
    pan_motion: Option<PM>,
    pan_enable: Option<PEN>,
    tilt_motion: Option<TM>,
    tilt_enable: Option<TEN>,
    select: Option<SEL>,
}

impl<PM, PEN, TM, TEN, SEL> Default for TurntableBuilder<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<PM, PEN, TM, TEN, SEL> TurntableBuilder<PM, PEN, TM, TEN, SEL>
where
    PM: MotionPrimitive,
    PEN: OutputPin,
    TM: MotionPrimitive,
    TEN: OutputPin,
    SEL: MicrostepLines,
{
    /// Create a new builder for the reference hardware configuration.
    pub fn new() -> Self {
        Self {
            config: TurntableConfig::default(),
            pan_motion: None,
            pan_enable: None,
            tilt_motion: None,
            tilt_enable: None,
            select: None,
        }
    }

    /// Use a loaded configuration.
    pub fn config(mut self, config: TurntableConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pan motion primitive.
    pub fn pan_motion(mut self, motion: PM) -> Self {
        self.pan_motion = Some(motion);
        self
    }

    /// Set the pan driver enable line.
    pub fn pan_enable(mut self, pin: PEN) -> Self {
        self.pan_enable = Some(pin);
        self
    }

    /// Set the tilt motion primitive.
    pub fn tilt_motion(mut self, motion: TM) -> Self {
        self.tilt_motion = Some(motion);
        self
    }

    /// Set the tilt driver enable line.
    pub fn tilt_enable(mut self, pin: TEN) -> Self {
        self.tilt_enable = Some(pin);
        self
    }

    /// Set the shared microstep select lines.
    pub fn microstep_select(mut self, select: SEL) -> Self {
        self.select = Some(select);
        self
    }

    /// Build and boot the controller.
    ///
    /// # Errors
    ///
    /// Returns an error if a hardware part is missing, the configuration is
    /// invalid, or a line cannot be driven during boot.
    pub fn build(self) -> Result<DualAxisController<PM, PEN, TM, TEN, SEL>> {
        self.build_parts().map(|(controller, _)| controller)
    }

    /// Build and boot the controller, wrapped in a protocol engine.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_engine(self) -> Result<ProtocolEngine<PM, PEN, TM, TEN, SEL>> {
        let (controller, config) = self.build_parts()?;
        Ok(ProtocolEngine::new(controller, config.protocol))
    }

    fn build_parts(self) -> Result<(DualAxisController<PM, PEN, TM, TEN, SEL>, TurntableConfig)> {
        validate_config(&self.config)?;

        let pan_motion = self.pan_motion.ok_or_else(|| missing("pan_motion"))?;
        let pan_enable = self.pan_enable.ok_or_else(|| missing("pan_enable"))?;
        let tilt_motion = self.tilt_motion.ok_or_else(|| missing("tilt_motion"))?;
        let tilt_enable = self.tilt_enable.ok_or_else(|| missing("tilt_enable"))?;
        let select = self.select.ok_or_else(|| missing("microstep_select"))?;

        let pan = GearedAxis::new(&self.config.pan, pan_motion, pan_enable);
        let tilt = GearedAxis::new(&self.config.tilt, tilt_motion, tilt_enable);

        let mut controller =
            DualAxisController::new(pan, tilt, select, self.config.motion.clone());
        controller.begin()?;

        Ok((controller, self.config))
    }
}

fn missing(field: &'static str) -> Error {
    Error::Config(ConfigError::MissingField(field))
}
