//! Digital I/O port contract and adapters.
//!
//! The controller talks to hardware only through [`DigitalIo`]: configure a
//! named pin, write a level, read a level. Every call may fail.

mod hal;
#[cfg(feature = "std")]
mod shared;
#[cfg(feature = "std")]
mod sim;
#[cfg(feature = "std")]
mod spin;

pub use hal::HalPinBank;
#[cfg(feature = "std")]
pub use shared::SharedIo;
#[cfg(feature = "std")]
pub use sim::{IoEvent, Journal, SimulatedIo};
#[cfg(feature = "std")]
pub use spin::SpinDelay;

pub use crate::error::{IoError, IoErrorKind, IoOperation};

/// Platform pin number.
pub type PinId = u8;

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    /// Input
    In,
    /// Output
    Out,
}

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// 0
    Low,
    /// 1
    High,
}

impl Level {
    /// Level as the bit written to the line.
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// A digital I/O port addressed by pin number.
pub trait DigitalIo {
    /// Set a pin's direction.
    fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), IoError>;

    /// Drive an output pin.
    fn write(&mut self, pin: PinId, level: Level) -> Result<(), IoError>;

    /// Sample a pin.
    fn read(&mut self, pin: PinId) -> Result<Level, IoError>;
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), IoError> {
        T::configure(self, pin, direction)
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), IoError> {
        T::write(self, pin, level)
    }

    fn read(&mut self, pin: PinId) -> Result<Level, IoError> {
        T::read(self, pin)
    }
}
