//! Position model.
//!
//! Position is dead reckoning: the sum of the step deltas that reached the
//! drivers, in millimeters from the origin. Nothing is ever read back from
//! hardware.

use crate::config::{Axis, AxisConfig, PerAxis};

/// Millimeter offset of each axis from the origin.
pub type Position = PerAxis<f64>;

/// A partial target or delta; `None` leaves the axis where it is.
pub type AxisTargets = PerAxis<Option<f64>>;

/// The origin, where every controller starts and every home ends.
pub const ORIGIN: Position = PerAxis::new(0.0, 0.0, 0.0);

impl PerAxis<Option<f64>> {
    /// Targets naming no axis.
    pub const NONE: AxisTargets = PerAxis::new(None, None, None);

    /// A single-axis target.
    pub fn only(axis: Axis, value: f64) -> Self {
        let mut targets = Self::NONE;
        targets[axis] = Some(value);
        targets
    }

    /// Whether no axis is named.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, v)| v.is_none())
    }

    /// Every axis set to a value.
    pub fn all(position: Position) -> Self {
        position.map(|_, v| Some(v))
    }
}

impl PerAxis<f64> {
    /// Add the travel of `steps` steps on `axis` to the position.
    pub fn credit_steps(&mut self, axis: Axis, config: &AxisConfig, steps: i64) {
        self[axis] += config.mm_for(steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_targets() {
        let targets = AxisTargets::only(Axis::Y, -0.5);
        assert_eq!(targets.x, None);
        assert_eq!(targets.y, Some(-0.5));
        assert!(!targets.is_empty());
        assert!(AxisTargets::NONE.is_empty());
        assert_eq!(AxisTargets::all(ORIGIN), PerAxis::new(Some(0.0), Some(0.0), Some(0.0)));
    }

    #[test]
    fn test_credit_steps() {
        let z = AxisConfig::new(25, 8, 7, 200.0);
        let mut position = ORIGIN;
        position.credit_steps(Axis::Z, &z, -3);
        assert!((position.z + 0.015).abs() < 1e-12);
        assert_eq!(position.x, 0.0);
    }
}
