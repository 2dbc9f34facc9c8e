//! Unit types for physical quantities.

use serde::{Deserialize, Serialize};

/// Step rate in steps per second.
///
/// The controller applies this as a constant inter-pulse delay; there is no
/// acceleration ramp.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StepsPerSecond(pub f64);

impl StepsPerSecond {
    /// Create a new rate.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// A usable rate is finite and strictly positive.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// Delay held at each of the high and low phases of one step pulse.
    ///
    /// `1_000_000 / (2 * rate)` microseconds, rounded, never below 1 µs.
    pub fn half_period_us(self) -> u32 {
        let half = libm::round(1_000_000.0 / (2.0 * self.0));
        if half >= u32::MAX as f64 {
            u32::MAX
        } else if half < 1.0 {
            1
        } else {
            half as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_period() {
        assert_eq!(StepsPerSecond(1000.0).half_period_us(), 500);
        assert_eq!(StepsPerSecond(500.0).half_period_us(), 1000);
        assert_eq!(StepsPerSecond(3000.0).half_period_us(), 167);
        // Faster than the timer resolution clamps to the minimum.
        assert_eq!(StepsPerSecond(2_000_000.0).half_period_us(), 1);
    }

    #[test]
    fn test_validity() {
        assert!(StepsPerSecond(1.0).is_valid());
        assert!(!StepsPerSecond(0.0).is_valid());
        assert!(!StepsPerSecond(-10.0).is_valid());
        assert!(!StepsPerSecond(f64::NAN).is_valid());
        assert!(!StepsPerSecond(f64::INFINITY).is_valid());
    }
}
