//! A port shared between the motion path and the emergency-stop path.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DigitalIo, IoError, Level, PinDirection, PinId};

/// Cloneable handle to one port.
///
/// Each call locks the port for that single call only, so a stop issued
/// from another thread lands between two writes of a running pulse train.
pub struct SharedIo<P> {
    inner: Arc<Mutex<P>>,
}

impl<P> Clone for SharedIo<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: DigitalIo> SharedIo<P> {
    /// Wrap a port.
    pub fn new(port: P) -> Self {
        Self {
            inner: Arc::new(Mutex::new(port)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, P> {
        // A panic elsewhere must not lock the motors out of a stop.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: DigitalIo> DigitalIo for SharedIo<P> {
    fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), IoError> {
        self.lock().configure(pin, direction)
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), IoError> {
        self.lock().write(pin, level)
    }

    fn read(&mut self, pin: PinId) -> Result<Level, IoError> {
        self.lock().read(pin)
    }
}
