//! Commands the controller accepts and what it reports back.

use serde::{Deserialize, Serialize};

use crate::config::{Axis, StepsPerSecond};
use crate::io::IoError;

use super::position::{AxisTargets, Position};

/// Direction of a focus nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum FocusDirection {
    /// Positive Z.
    Up,
    /// Negative Z.
    Down,
}

impl FocusDirection {
    /// Sign applied to the step count.
    #[inline]
    pub const fn sign(self) -> i64 {
        match self {
            FocusDirection::Up => 1,
            FocusDirection::Down => -1,
        }
    }
}

/// A request to the motion controller.
///
/// `speed: None` runs at the configured default rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Drive the named axes to absolute positions.
    MoveAbsolute {
        /// Targets in millimeters.
        target: AxisTargets,
        /// Step rate.
        speed: Option<StepsPerSecond>,
    },
    /// Drive the named axes by relative amounts.
    MoveRelative {
        /// Deltas in millimeters.
        delta: AxisTargets,
        /// Step rate.
        speed: Option<StepsPerSecond>,
    },
    /// Drive to the home offset, then take that point as the origin.
    Home,
    /// Nudge Z by raw steps.
    FocusAdjust {
        /// Up or down.
        direction: FocusDirection,
        /// Steps to take.
        steps: u32,
        /// Step rate.
        speed: Option<StepsPerSecond>,
    },
    /// De-energize every axis now.
    EmergencyStop,
    /// Report the position.
    GetPosition,
    /// Report position and state.
    GetStatus,
}

impl MotionCommand {
    /// Whether the command moves the stage and so needs the busy flag.
    pub const fn is_motion(&self) -> bool {
        matches!(
            self,
            MotionCommand::MoveAbsolute { .. }
                | MotionCommand::MoveRelative { .. }
                | MotionCommand::Home
                | MotionCommand::FocusAdjust { .. }
        )
    }

    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            MotionCommand::MoveAbsolute { .. } => "move_absolute",
            MotionCommand::MoveRelative { .. } => "move_relative",
            MotionCommand::Home => "home",
            MotionCommand::FocusAdjust { .. } => "focus_adjust",
            MotionCommand::EmergencyStop => "emergency_stop",
            MotionCommand::GetPosition => "get_position",
            MotionCommand::GetStatus => "get_status",
        }
    }
}

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    /// Pins not configured yet, or released.
    Uninitialized,
    /// Ready for a motion command.
    Idle,
    /// A motion command is in flight.
    Moving,
}

/// Snapshot of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionStatus {
    /// Current position.
    pub position: Position,
    /// Busy flag.
    #[serde(rename = "isMoving")]
    pub busy: bool,
    /// Whether the pins are configured.
    #[serde(rename = "isInitialized")]
    pub initialized: bool,
    /// Lifecycle state.
    pub state: ControllerState,
}

/// Result of an emergency stop.
///
/// The stop always succeeds logically; `failed` lists the axes whose
/// disable write did not go through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopReport {
    /// Axes left possibly energized, with the error hit.
    pub failed: heapless::Vec<(Axis, IoError), 3>,
}

impl StopReport {
    /// Whether every disable write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Motion finished; position afterwards.
    Moved(Position),
    /// Emergency stop issued.
    Stopped(StopReport),
    /// Current position.
    Position(Position),
    /// Current status.
    Status(MotionStatus),
}
