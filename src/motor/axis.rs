//! Axis driver: one axis's STEP/DIR/ENABLE lines.

use embedded_hal::delay::DelayNs;
use tracing::{debug, warn};

use crate::config::{Axis, AxisConfig, StepsPerSecond};
use crate::io::{DigitalIo, IoError, Level, PinDirection};

use super::halt::HaltGuard;
use super::pulse::{PulseFault, PulseGenerator, PulseOutcome};

/// ENABLE level that energizes the driver (active low).
pub const ENABLED: Level = Level::Low;
/// ENABLE level that de-energizes the driver.
pub const DISABLED: Level = Level::High;

/// One axis's share of a command, in raw steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepJob {
    /// Axis to drive.
    pub axis: Axis,
    /// Steps to take; the sign is the direction.
    pub signed_steps: i64,
    /// Hold per pulse phase.
    pub half_period_us: u32,
}

impl StepJob {
    /// Job at a given step rate.
    pub fn new(axis: Axis, signed_steps: i64, speed: StepsPerSecond) -> Self {
        Self {
            axis,
            signed_steps,
            half_period_us: speed.half_period_us(),
        }
    }

    /// Pulses to emit.
    ///
    /// Saturates at `u32::MAX`; planning rejects anything larger.
    pub fn pulse_count(&self) -> u32 {
        u32::try_from(self.signed_steps.unsigned_abs()).unwrap_or(u32::MAX)
    }

    /// DIR level: high for positive travel.
    pub fn direction(&self) -> Level {
        Level::from(self.signed_steps > 0)
    }
}

/// How a drive ended without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// All steps taken.
    Completed {
        /// Steps taken.
        steps: u32,
    },
    /// Stopped early by a halt.
    Halted {
        /// Steps taken before the halt.
        steps: u32,
    },
}

/// A drive aborted by a port error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveFault {
    /// Axis that failed.
    pub axis: Axis,
    /// Steps taken before the failure.
    pub completed_steps: u32,
    /// The first error hit.
    pub error: IoError,
}

/// Drives one axis through enable, direction, pulse train, disable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDriver {
    axis: Axis,
    config: AxisConfig,
}

impl AxisDriver {
    /// Create a driver for `axis` wired as `config`.
    pub const fn new(axis: Axis, config: AxisConfig) -> Self {
        Self { axis, config }
    }

    /// Axis this driver owns.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Wiring and scale.
    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Configure all three lines as outputs and leave the driver disabled.
    ///
    /// # Errors
    ///
    /// Returns the first failed call.
    pub fn configure<IO: DigitalIo + ?Sized>(&self, io: &mut IO) -> Result<(), IoError> {
        for pin in self.config.pins() {
            io.configure(pin, PinDirection::Out)?;
        }
        io.write(self.config.enable_pin, DISABLED)
    }

    /// De-energize the driver.
    ///
    /// # Errors
    ///
    /// Returns the port error if the write failed.
    pub fn disable<IO: DigitalIo + ?Sized>(&self, io: &mut IO) -> Result<(), IoError> {
        io.write(self.config.enable_pin, DISABLED)
    }

    /// Run `job` to completion, to a halt, or to the first port error.
    ///
    /// A zero-step job, or one whose halt has already tripped, returns at
    /// once without touching any line. Otherwise the driver is disabled
    /// again on every exit path; if that final write fails after an earlier
    /// error, the earlier error is reported.
    ///
    /// # Errors
    ///
    /// Returns a [`DriveFault`] carrying the steps taken before the failure.
    pub fn drive<IO, D>(
        &self,
        io: &mut IO,
        pulses: &mut PulseGenerator<D>,
        job: &StepJob,
        guard: &HaltGuard<'_>,
    ) -> Result<DriveOutcome, DriveFault>
    where
        IO: DigitalIo + ?Sized,
        D: DelayNs,
    {
        let count = job.pulse_count();
        if count == 0 {
            return Ok(DriveOutcome::Completed { steps: 0 });
        }
        // A stop may already have disabled this axis; do not re-enable it.
        if guard.is_triggered() {
            return Ok(DriveOutcome::Halted { steps: 0 });
        }

        debug!(
            axis = %self.axis,
            steps = job.signed_steps,
            half_period_us = job.half_period_us,
            "Driving axis"
        );

        let result = self.run(io, pulses, job, count, guard);
        let disabled = self.disable(io);

        match (result, disabled) {
            (Ok(outcome), Ok(())) => Ok(match outcome {
                PulseOutcome::Completed(steps) => DriveOutcome::Completed { steps },
                PulseOutcome::Halted(steps) => DriveOutcome::Halted { steps },
            }),
            (Ok(outcome), Err(error)) => Err(self.fault(outcome.emitted(), error)),
            (Err(fault), disabled) => {
                if let Err(e) = disabled {
                    warn!(axis = %self.axis, error = %e, "Could not disable driver after failure");
                }
                Err(self.fault(fault.completed, fault.error))
            }
        }
    }

    fn run<IO, D>(
        &self,
        io: &mut IO,
        pulses: &mut PulseGenerator<D>,
        job: &StepJob,
        count: u32,
        guard: &HaltGuard<'_>,
    ) -> Result<PulseOutcome, PulseFault>
    where
        IO: DigitalIo + ?Sized,
        D: DelayNs,
    {
        let before_pulses = |error| PulseFault { completed: 0, error };

        io.write(self.config.enable_pin, ENABLED).map_err(before_pulses)?;
        io.write(self.config.dir_pin, job.direction()).map_err(before_pulses)?;

        pulses.emit(io, self.config.step_pin, count, job.half_period_us, guard)
    }

    fn fault(&self, completed_steps: u32, error: IoError) -> DriveFault {
        DriveFault {
            axis: self.axis,
            completed_steps,
            error,
        }
    }
}
