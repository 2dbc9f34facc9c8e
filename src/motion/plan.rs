//! Decomposition of position commands into per-axis step counts.
//!
//! Each named axis gets `round(delta_mm * steps_per_mm)` signed steps.
//! Axes that round to zero steps are left out entirely: no pulses, no
//! enable cycle, no position credit.

use crate::config::{Axis, AxisConfig, PerAxis, StepsPerSecond};
use crate::error::MotionError;
use crate::motor::StepJob;

use super::command::FocusDirection;
use super::position::{AxisTargets, Position};

/// One axis's share of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisMove {
    /// Signed step count handed to the driver.
    pub steps: i64,
    /// Travel credited to the position when every step lands.
    pub delta_mm: f64,
}

impl AxisMove {
    /// A move with nothing to do.
    pub const IDLE: AxisMove = AxisMove {
        steps: 0,
        delta_mm: 0.0,
    };
}

/// Per-axis step counts for one command, driven X then Y then Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionPlan {
    /// Move of each axis.
    pub moves: PerAxis<AxisMove>,
}

impl MotionPlan {
    /// Axes with steps to take, in driving order.
    pub fn active(&self) -> impl Iterator<Item = (Axis, AxisMove)> + '_ {
        self.moves
            .iter()
            .filter(|(_, m)| m.steps != 0)
            .map(|(axis, m)| (axis, *m))
    }

    /// Whether the plan moves nothing.
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Step jobs at `speed`, in driving order.
    pub fn jobs(&self, speed: StepsPerSecond) -> impl Iterator<Item = (StepJob, AxisMove)> + '_ {
        self.active()
            .map(move |(axis, m)| (StepJob::new(axis, m.steps, speed), m))
    }
}

/// Plan a move to absolute targets from `current`.
///
/// # Errors
///
/// [`MotionError::StepOverflow`] if an axis needs more steps than one pulse
/// train can carry.
pub fn plan_absolute(
    axes: &PerAxis<AxisConfig>,
    current: &Position,
    target: &AxisTargets,
) -> Result<MotionPlan, MotionError> {
    let deltas = target.map(|axis, t| t.map(|t| t - current[axis]));
    plan_relative(axes, &deltas)
}

/// Plan a move by relative deltas.
///
/// # Errors
///
/// [`MotionError::StepOverflow`] if an axis needs more steps than one pulse
/// train can carry.
pub fn plan_relative(axes: &PerAxis<AxisConfig>, delta: &AxisTargets) -> Result<MotionPlan, MotionError> {
    let mut plan = MotionPlan::default();
    for axis in Axis::ALL {
        if let Some(delta_mm) = delta[axis] {
            let steps = to_steps(axis, axes[axis].steps_for(delta_mm))?;
            plan.moves[axis] = if steps == 0 {
                AxisMove::IDLE
            } else {
                AxisMove { steps, delta_mm }
            };
        }
    }
    Ok(plan)
}

/// Plan a raw-step nudge of the focus axis.
pub fn plan_focus(z: &AxisConfig, direction: FocusDirection, steps: u32) -> MotionPlan {
    let steps = direction.sign() * i64::from(steps);
    let mut plan = MotionPlan::default();
    plan.moves.z = AxisMove {
        steps,
        delta_mm: z.mm_for(steps),
    };
    plan
}

fn to_steps(axis: Axis, steps: f64) -> Result<i64, MotionError> {
    if steps.is_nan() || libm::fabs(steps) > u32::MAX as f64 {
        return Err(MotionError::StepOverflow { axis });
    }
    Ok(steps as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::position::ORIGIN;
    use proptest::prelude::*;

    fn axes() -> PerAxis<AxisConfig> {
        PerAxis::new(
            AxisConfig::new(17, 18, 27, 100.0),
            AxisConfig::new(22, 23, 24, 100.0),
            AxisConfig::new(25, 8, 7, 200.0),
        )
    }

    #[test]
    fn test_relative_step_count() {
        let plan = plan_relative(&axes(), &AxisTargets::only(Axis::X, 2.5)).unwrap();
        assert_eq!(plan.moves.x.steps, 250);
        assert_eq!(plan.moves.x.delta_mm, 2.5);
        assert_eq!(plan.active().count(), 1);
    }

    #[test]
    fn test_absolute_decomposition() {
        let target = PerAxis::new(Some(1.0), Some(-0.5), None);
        let plan = plan_absolute(&axes(), &ORIGIN, &target).unwrap();

        let jobs: Vec<_> = plan.jobs(StepsPerSecond(1000.0)).map(|(job, _)| job).collect();
        assert_eq!(
            jobs,
            [
                StepJob::new(Axis::X, 100, StepsPerSecond(1000.0)),
                StepJob::new(Axis::Y, -50, StepsPerSecond(1000.0)),
            ]
        );
    }

    #[test]
    fn test_target_at_current_position_is_skipped() {
        let current = PerAxis::new(3.0, 4.0, 1.0);
        let target = PerAxis::new(Some(3.0), Some(5.0), Some(1.0));
        let plan = plan_absolute(&axes(), &current, &target).unwrap();

        assert_eq!(plan.moves.x, AxisMove::IDLE);
        assert_eq!(plan.moves.z, AxisMove::IDLE);
        assert_eq!(plan.moves.y.steps, 100);
    }

    #[test]
    fn test_sub_step_delta_is_skipped() {
        let plan = plan_relative(&axes(), &AxisTargets::only(Axis::X, 0.004)).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_focus_uses_raw_steps() {
        let plan = plan_focus(&axes().z, FocusDirection::Down, 4);
        assert_eq!(plan.moves.z.steps, -4);
        assert!((plan.moves.z.delta_mm + 0.02).abs() < 1e-12);
        assert_eq!(plan.active().count(), 1);

        assert!(plan_focus(&axes().z, FocusDirection::Up, 0).is_empty());
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(
            plan_relative(&axes(), &AxisTargets::only(Axis::Y, 1e12)),
            Err(MotionError::StepOverflow { axis: Axis::Y })
        );
        assert_eq!(
            plan_relative(&axes(), &AxisTargets::only(Axis::Z, f64::NAN)),
            Err(MotionError::StepOverflow { axis: Axis::Z })
        );
    }

    proptest! {
        #[test]
        fn prop_steps_round_delta(delta in -500.0f64..500.0, spm in 1.0f64..400.0) {
            let mut config = axes();
            config.x.steps_per_mm = spm;
            let plan = plan_relative(&config, &AxisTargets::only(Axis::X, delta)).unwrap();

            let steps = plan.moves.x.steps as f64;
            prop_assert!((steps - delta * spm).abs() <= 0.5 + 1e-9);
            prop_assert_eq!(plan.moves.y, AxisMove::IDLE);
            prop_assert_eq!(plan.moves.z, AxisMove::IDLE);
        }

        #[test]
        fn prop_absolute_lands_on_target(
            current in -100.0f64..100.0,
            target in -100.0f64..100.0,
        ) {
            let position = PerAxis::new(0.0, current, 0.0);
            let plan = plan_absolute(&axes(), &position, &AxisTargets::only(Axis::Y, target)).unwrap();

            let m = plan.moves.y;
            if m.steps != 0 {
                prop_assert!((current + m.delta_mm - target).abs() < 1e-9);
            } else {
                prop_assert!((target - current).abs() * 100.0 <= 0.5 + 1e-9);
            }
        }
    }
}
