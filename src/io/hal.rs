//! [`DigitalIo`] over embedded-hal 1.0 pins.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{DigitalIo, IoError, IoErrorKind, IoOperation, Level, PinDirection, PinId};

struct BankPin<P> {
    id: PinId,
    pin: P,
    direction: Option<PinDirection>,
}

/// A bank of up to `N` embedded-hal pins addressed by number.
///
/// `configure` only records the direction; the HAL pin types already carry
/// their electrical mode. Writing a pin configured as an input is refused.
pub struct HalPinBank<P, const N: usize> {
    pins: heapless::Vec<BankPin<P>, N>,
}

impl<P, const N: usize> Default for HalPinBank<P, N>
where
    P: OutputPin + InputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: usize> HalPinBank<P, N>
where
    P: OutputPin + InputPin,
{
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            pins: heapless::Vec::new(),
        }
    }

    /// Add a pin under `id`.
    ///
    /// # Errors
    ///
    /// Hands the pin back if the bank is full or `id` is taken.
    pub fn insert(&mut self, id: PinId, pin: P) -> Result<(), P> {
        if self.pins.iter().any(|p| p.id == id) {
            return Err(pin);
        }
        self.pins
            .push(BankPin {
                id,
                pin,
                direction: None,
            })
            .map_err(|bank_pin| bank_pin.pin)
    }

    /// Builder-style [`insert`](Self::insert); a rejected pin is dropped.
    pub fn with_pin(mut self, id: PinId, pin: P) -> Self {
        let _ = self.insert(id, pin);
        self
    }

    /// Number of pins in the bank.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Whether the bank has no pins.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Direction recorded for `id`, if configured.
    pub fn direction(&self, id: PinId) -> Option<PinDirection> {
        self.pins.iter().find(|p| p.id == id).and_then(|p| p.direction)
    }

    /// Mutable access to every pin, e.g. to finish mock expectations.
    pub fn pins_mut(&mut self) -> impl Iterator<Item = (PinId, &mut P)> {
        self.pins.iter_mut().map(|p| (p.id, &mut p.pin))
    }

    fn slot(&mut self, id: PinId, operation: IoOperation) -> Result<&mut BankPin<P>, IoError> {
        self.pins
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(IoError::new(id, operation, IoErrorKind::PinUnavailable))
    }
}

impl<P, const N: usize> DigitalIo for HalPinBank<P, N>
where
    P: OutputPin + InputPin,
{
    fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), IoError> {
        self.slot(pin, IoOperation::Configure)?.direction = Some(direction);
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), IoError> {
        let slot = self.slot(pin, IoOperation::Write)?;
        if slot.direction == Some(PinDirection::In) {
            return Err(IoError::new(pin, IoOperation::Write, IoErrorKind::WrongDirection));
        }

        let result = match level {
            Level::High => slot.pin.set_high(),
            Level::Low => slot.pin.set_low(),
        };
        result.map_err(|_| IoError::new(pin, IoOperation::Write, IoErrorKind::Hardware))
    }

    fn read(&mut self, pin: PinId) -> Result<Level, IoError> {
        let slot = self.slot(pin, IoOperation::Read)?;
        slot.pin
            .is_high()
            .map(Level::from)
            .map_err(|_| IoError::new(pin, IoOperation::Read, IoErrorKind::Hardware))
    }
}
