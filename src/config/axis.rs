//! Axis identifiers and per-axis wiring.

use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::io::PinId;

/// One linear degree of freedom of the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Stage X.
    X,
    /// Stage Y.
    Y,
    /// Focus.
    Z,
}

impl Axis {
    /// All axes, in the order multi-axis moves drive them.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lowercase name as used in configuration and on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per axis.
///
/// Serialized as `{ x, y, z }`. With `T = Option<_>` missing keys
/// deserialize as `None`, which is how partial targets are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerAxis<T> {
    /// X value.
    pub x: T,
    /// Y value.
    pub y: T,
    /// Z value.
    pub z: T,
}

impl<T> PerAxis<T> {
    /// Build from three values.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Apply `f` to every axis value.
    pub fn map<U>(self, mut f: impl FnMut(Axis, T) -> U) -> PerAxis<U> {
        PerAxis {
            x: f(Axis::X, self.x),
            y: f(Axis::Y, self.y),
            z: f(Axis::Z, self.z),
        }
    }

    /// Iterate `(axis, &value)` in X, Y, Z order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        [(Axis::X, &self.x), (Axis::Y, &self.y), (Axis::Z, &self.z)].into_iter()
    }
}

impl<T> Index<Axis> for PerAxis<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Wiring and scale of one axis. Fixed for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AxisConfig {
    /// STEP line.
    pub step_pin: PinId,
    /// DIR line (high = positive direction).
    pub dir_pin: PinId,
    /// ENABLE line, active low.
    pub enable_pin: PinId,
    /// Steps needed to travel one millimeter.
    pub steps_per_mm: f64,
}

impl AxisConfig {
    /// Create an axis configuration.
    pub const fn new(step_pin: PinId, dir_pin: PinId, enable_pin: PinId, steps_per_mm: f64) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            steps_per_mm,
        }
    }

    /// Nearest whole step count for a travel in millimeters.
    pub fn steps_for(&self, mm: f64) -> f64 {
        libm::round(mm * self.steps_per_mm)
    }

    /// Travel in millimeters produced by `steps` steps.
    pub fn mm_for(&self, steps: i64) -> f64 {
        steps as f64 / self.steps_per_mm
    }

    /// The three pins of this axis, step first.
    pub fn pins(&self) -> [PinId; 3] {
        [self.step_pin, self.dir_pin, self.enable_pin]
    }
}
