//! Unit tests for configuration validation.

use turntable_motion::config::{validate_config, AxisConfig, TurntableConfig};
use turntable_motion::error::{ConfigError, Error};

/// Test validation of the reference configuration.
#[test]
fn test_reference_config_passes_validation() {
    assert!(validate_config(&TurntableConfig::default()).is_ok());
}

/// Test validation fails for a zero or NaN gear ratio.
#[test]
fn test_gear_ratio_must_be_positive() {
    for ratio in [0.0, -11.335, f32::NAN] {
        let mut config = TurntableConfig::default();
        config.pan = AxisConfig::new("pan", 100, ratio);
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidGearRatio(_)))
        ));
    }
}

/// Test validation fails for zero base steps.
#[test]
fn test_base_steps_must_be_positive() {
    let mut config = TurntableConfig::default();
    config.tilt = AxisConfig::new("tilt", 0, 46.5);
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidBaseSteps(0)))
    );
}

/// Test validation of the boot motion settings.
#[test]
fn test_motion_settings_must_be_positive() {
    let mut config = TurntableConfig::default();
    config.motion.initial_speed = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSpeed(_)))
    ));

    let mut config = TurntableConfig::default();
    config.motion.initial_acceleration = -80.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAcceleration(_)))
    ));

    let mut config = TurntableConfig::default();
    config.motion.speed_down_factor = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSpeedFactor(_)))
    ));
}

/// Test error messages name the offending value.
#[test]
fn test_error_display() {
    let err = Error::Config(ConfigError::InvalidMicrosteps(3));
    assert_eq!(
        err.to_string(),
        "Configuration error: Invalid microsteps: 3. Valid values: 1, 2, 4, 8, 16"
    );
}
