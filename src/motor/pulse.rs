//! Step pulse generation.
//!
//! A pulse is `STEP = 1`, hold one half-period, `STEP = 0`, hold one
//! half-period. The holds go through [`DelayNs`], which on hosts is a
//! monotonic busy-wait: it never yields and cannot be interrupted.
//!
//! A halt is checked before every rising edge and again after the high
//! hold, so a stop takes effect within one half-period of being requested.
//! The line is always brought back low before returning.

use embedded_hal::delay::DelayNs;
use tracing::trace;

use crate::io::{DigitalIo, IoError, Level, PinId};

use super::halt::{Halt, HaltGuard};

/// Pulses between progress traces.
const PROGRESS_INTERVAL: u32 = 100;

/// How a pulse train ended without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOutcome {
    /// Every requested pulse was emitted.
    Completed(u32),
    /// A halt cut the train short after this many pulses.
    Halted(u32),
}

impl PulseOutcome {
    /// Pulses that reached the driver.
    pub fn emitted(self) -> u32 {
        match self {
            PulseOutcome::Completed(n) | PulseOutcome::Halted(n) => n,
        }
    }
}

/// A pulse train aborted by a port error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseFault {
    /// Pulses whose rising edge was written before the failure.
    pub completed: u32,
    /// The first error hit.
    pub error: IoError,
}

/// Drives step pulses at a fixed rate.
#[derive(Debug)]
pub struct PulseGenerator<D> {
    delay: D,
}

impl<D: DelayNs> PulseGenerator<D> {
    /// Create a generator timed by `delay`.
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Give the delay provider back.
    pub fn into_inner(self) -> D {
        self.delay
    }

    /// Emit `count` pulses on `step_pin` with no way to halt them.
    ///
    /// # Errors
    ///
    /// Returns the first port error; pulses already emitted are not undone.
    pub fn emit_pulses<IO>(
        &mut self,
        io: &mut IO,
        step_pin: PinId,
        count: u32,
        half_period_us: u32,
    ) -> Result<u32, PulseFault>
    where
        IO: DigitalIo + ?Sized,
    {
        let halt = Halt::new();
        let guard = halt.guard(halt.ticket());
        self.emit(io, step_pin, count, half_period_us, &guard)
            .map(PulseOutcome::emitted)
    }

    /// Emit up to `count` pulses, stopping early when `guard` trips.
    ///
    /// # Errors
    ///
    /// Returns the first port error together with the pulses emitted so far.
    pub fn emit<IO>(
        &mut self,
        io: &mut IO,
        step_pin: PinId,
        count: u32,
        half_period_us: u32,
        guard: &HaltGuard<'_>,
    ) -> Result<PulseOutcome, PulseFault>
    where
        IO: DigitalIo + ?Sized,
    {
        for done in 0..count {
            if guard.is_triggered() {
                return Ok(PulseOutcome::Halted(done));
            }

            io.write(step_pin, Level::High)
                .map_err(|error| PulseFault { completed: done, error })?;
            self.delay.delay_us(half_period_us);

            // The rising edge has stepped the motor.
            let emitted = done + 1;
            io.write(step_pin, Level::Low)
                .map_err(|error| PulseFault { completed: emitted, error })?;

            if guard.is_triggered() {
                return Ok(PulseOutcome::Halted(emitted));
            }
            self.delay.delay_us(half_period_us);

            if emitted % PROGRESS_INTERVAL == 0 {
                trace!(pin = step_pin, emitted, count, "Pulse progress");
            }
        }

        Ok(PulseOutcome::Completed(count))
    }
}
