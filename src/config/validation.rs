//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, TurntableConfig};

/// Validate a turntable configuration.
///
/// Checks:
/// - Both axes have a positive gear ratio and base step count
/// - Boot speed and acceleration are positive
/// - Speed adjust factors are positive
///
/// Every real-valued setting must also be finite; NaN is rejected.
pub fn validate_config(config: &TurntableConfig) -> Result<()> {
    validate_axis(&config.pan)?;
    validate_axis(&config.tilt)?;

    let motion = &config.motion;
    if !positive(motion.initial_speed) {
        return Err(Error::Config(ConfigError::InvalidSpeed(motion.initial_speed)));
    }

    if !positive(motion.initial_acceleration) {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            motion.initial_acceleration,
        )));
    }

    for factor in [motion.speed_up_factor, motion.speed_down_factor] {
        if !positive(factor) {
            return Err(Error::Config(ConfigError::InvalidSpeedFactor(factor)));
        }
    }

    Ok(())
}

fn validate_axis(config: &AxisConfig) -> Result<()> {
    if !positive(config.gear_ratio) {
        return Err(Error::Config(ConfigError::InvalidGearRatio(config.gear_ratio)));
    }

    if config.base_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidBaseSteps(config.base_steps)));
    }

    Ok(())
}

/// Finite and greater than zero.
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
