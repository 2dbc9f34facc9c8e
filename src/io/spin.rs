//! Busy-wait delay against the monotonic clock.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] that spins on [`Instant`] instead of sleeping.
///
/// Scheduler sleeps overshoot by tens of microseconds or more, which is
/// longer than a step half-period at useful rates. The wait never yields;
/// callers must size half-periods with that in mind.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    /// Create a spin delay.
    pub const fn new() -> Self {
        Self
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(u64::from(ns));
        while Instant::now() < deadline {
            core::hint::spin_loop();
        }
    }
}
