//! In-memory port for tests, demos and bench runs without hardware.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DigitalIo, IoError, IoErrorKind, IoOperation, Level, PinDirection, PinId};

/// One call that reached the simulated pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEvent {
    /// A pin direction was set.
    Configure {
        /// Pin
        pin: PinId,
        /// New direction
        direction: PinDirection,
    },
    /// An output was driven.
    Write {
        /// Pin
        pin: PinId,
        /// Level written
        level: Level,
    },
    /// A pin was sampled.
    Read {
        /// Pin
        pin: PinId,
    },
}

#[derive(Default)]
struct SimState {
    directions: HashMap<PinId, PinDirection>,
    levels: HashMap<PinId, Level>,
    events: VecDeque<IoEvent>,
    // Oldest events are dropped beyond this many.
    journal_limit: Option<usize>,
    configure_faults: Vec<PinId>,
    // Writes still allowed before the pin starts failing.
    write_faults: HashMap<PinId, usize>,
}

impl SimState {
    fn record(&mut self, event: IoEvent) {
        if let Some(limit) = self.journal_limit {
            if limit == 0 {
                return;
            }
            while self.events.len() >= limit {
                self.events.pop_front();
            }
        }
        self.events.push_back(event);
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated digital port.
///
/// Clones share the same pins, so a test can keep a handle for fault
/// injection after moving the port into a controller. Failed calls leave no
/// trace in the [`Journal`].
#[derive(Clone, Default)]
pub struct SimulatedIo {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedIo {
    /// Create a port with every pin floating and no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A port whose journal keeps only the latest `limit` events.
    ///
    /// Long-running sessions record every pulse; without a limit the journal
    /// grows for as long as the port lives.
    pub fn with_journal_limit(limit: usize) -> Self {
        let io = Self::new();
        lock(&io.state).journal_limit = Some(limit);
        io
    }

    /// Read-only view of the calls made so far.
    pub fn journal(&self) -> Journal {
        Journal {
            state: Arc::clone(&self.state),
        }
    }

    /// Make every `configure` of `pin` fail.
    pub fn fail_configure(&self, pin: PinId) {
        lock(&self.state).configure_faults.push(pin);
    }

    /// Let `successful` more writes to `pin` through, then fail every write.
    pub fn fail_write_after(&self, pin: PinId, successful: usize) {
        lock(&self.state).write_faults.insert(pin, successful);
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut state = lock(&self.state);
        state.configure_faults.clear();
        state.write_faults.clear();
    }

    /// Drive the level an input pin reads back.
    pub fn set_input(&self, pin: PinId, level: Level) {
        lock(&self.state).levels.insert(pin, level);
    }

    /// Current level of a pin, if it was ever driven.
    pub fn level(&self, pin: PinId) -> Option<Level> {
        lock(&self.state).levels.get(&pin).copied()
    }

    /// Direction a pin was configured with.
    pub fn direction(&self, pin: PinId) -> Option<PinDirection> {
        lock(&self.state).directions.get(&pin).copied()
    }
}

impl DigitalIo for SimulatedIo {
    fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), IoError> {
        let mut state = lock(&self.state);
        if state.configure_faults.contains(&pin) {
            return Err(IoError::new(pin, IoOperation::Configure, IoErrorKind::Hardware));
        }
        state.directions.insert(pin, direction);
        state.record(IoEvent::Configure { pin, direction });
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), IoError> {
        let mut state = lock(&self.state);
        if let Some(remaining) = state.write_faults.get_mut(&pin) {
            if *remaining == 0 {
                return Err(IoError::new(pin, IoOperation::Write, IoErrorKind::Hardware));
            }
            *remaining -= 1;
        }
        if state.directions.get(&pin) == Some(&PinDirection::In) {
            return Err(IoError::new(pin, IoOperation::Write, IoErrorKind::WrongDirection));
        }
        state.levels.insert(pin, level);
        state.record(IoEvent::Write { pin, level });
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> Result<Level, IoError> {
        let mut state = lock(&self.state);
        let level = state.levels.get(&pin).copied().unwrap_or(Level::Low);
        state.record(IoEvent::Read { pin });
        Ok(level)
    }
}

/// Shared view of a [`SimulatedIo`] call history.
#[derive(Clone)]
pub struct Journal {
    state: Arc<Mutex<SimState>>,
}

impl Journal {
    /// Every successful call still kept, oldest first.
    pub fn events(&self) -> Vec<IoEvent> {
        lock(&self.state).events.iter().copied().collect()
    }

    /// Number of successful calls.
    pub fn len(&self) -> usize {
        lock(&self.state).events.len()
    }

    /// Whether no call has succeeded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Levels written to `pin`, oldest first.
    pub fn writes_to(&self, pin: PinId) -> Vec<Level> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match *event {
                IoEvent::Write { pin: p, level } if p == pin => Some(level),
                _ => None,
            })
            .collect()
    }

    /// Number of high writes to `pin`, i.e. step pulses on a STEP line.
    pub fn rising_edges(&self, pin: PinId) -> usize {
        self.writes_to(pin)
            .into_iter()
            .filter(|level| *level == Level::High)
            .count()
    }

    /// Forget the history; pin levels are kept.
    pub fn clear(&self) {
        lock(&self.state).events.clear();
    }
}
