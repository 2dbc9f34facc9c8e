//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{Axis, StageConfig};

/// Validate a stage configuration.
///
/// Checks:
/// - Every axis has a positive, finite steps-per-millimeter scale
/// - No pin is wired to two lines
/// - Default speed is usable and acceleration is non-negative
/// - Home offset and sample positions are finite
pub fn validate_config(config: &StageConfig) -> Result<()> {
    for axis in Axis::ALL {
        let spm = config.axis(axis).steps_per_mm;
        if !spm.is_finite() || spm <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidStepsPerMm { axis, value: spm }));
        }
    }

    validate_pins(config)?;

    let speed = config.motion.default_speed;
    if !speed.is_valid() {
        return Err(Error::Config(ConfigError::InvalidSpeed(speed.value())));
    }

    let accel = config.motion.default_acceleration;
    if !accel.is_finite() || accel < 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(accel)));
    }

    for (axis, offset) in config.motion.home_offset.iter() {
        if !offset.is_finite() {
            return Err(Error::Config(ConfigError::InvalidHomeOffset(axis)));
        }
    }

    for (name, point) in config.samples.iter() {
        if point.iter().any(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(ConfigError::InvalidSample(name.clone())));
        }
    }

    Ok(())
}

fn validate_pins(config: &StageConfig) -> Result<()> {
    let mut seen: heapless::Vec<u8, 9> = heapless::Vec::new();
    for axis in Axis::ALL {
        for pin in config.axis(axis).pins() {
            if seen.contains(&pin) {
                return Err(Error::Config(ConfigError::DuplicatePin(pin)));
            }
            // Capacity is exactly three axes of three pins.
            let _ = seen.push(pin);
        }
    }
    Ok(())
}
