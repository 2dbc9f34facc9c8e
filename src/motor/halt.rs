//! Emergency-stop signal shared between the stop path and running sequences.

use core::sync::atomic::{AtomicU32, Ordering};

/// Generation counter; a stop bumps it and so invalidates every ticket
/// issued before it.
///
/// Tickets make a stop sticky for the sequence it interrupted even if a new
/// motion starts right after it.
#[derive(Debug, Default)]
pub struct Halt {
    generation: AtomicU32,
}

/// Generation a sequence started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltTicket(u32);

impl Halt {
    /// Create a signal with no stop requested.
    pub const fn new() -> Self {
        Self {
            generation: AtomicU32::new(0),
        }
    }

    /// Ticket for a sequence starting now.
    pub fn ticket(&self) -> HaltTicket {
        HaltTicket(self.generation.load(Ordering::SeqCst))
    }

    /// Request a stop of every sequence holding a current ticket.
    pub fn trigger(&self) {
        #[cfg(target_has_atomic = "32")]
        let _ = self.generation.fetch_add(1, Ordering::SeqCst);

        // Load/store only targets: racing triggers may collapse into one bump.
        #[cfg(not(target_has_atomic = "32"))]
        {
            let next = self.generation.load(Ordering::SeqCst).wrapping_add(1);
            self.generation.store(next, Ordering::SeqCst);
        }
    }

    /// Whether a stop was requested since `ticket` was issued.
    pub fn is_triggered(&self, ticket: HaltTicket) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket.0
    }

    /// Bind a ticket for passing down to a pulse train.
    pub fn guard(&self, ticket: HaltTicket) -> HaltGuard<'_> {
        HaltGuard { halt: self, ticket }
    }
}

/// A [`Halt`] paired with the ticket of one sequence.
#[derive(Debug, Clone, Copy)]
pub struct HaltGuard<'a> {
    halt: &'a Halt,
    ticket: HaltTicket,
}

impl HaltGuard<'_> {
    /// Whether the sequence must stop.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.halt.is_triggered(self.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_invalidates_older_tickets_only() {
        let halt = Halt::new();
        let first = halt.ticket();
        assert!(!halt.is_triggered(first));

        halt.trigger();
        assert!(halt.is_triggered(first));

        let second = halt.ticket();
        assert!(!halt.is_triggered(second));
        assert!(halt.guard(first).is_triggered());
        assert!(!halt.guard(second).is_triggered());
    }

    #[test]
    fn test_racing_triggers_all_count() {
        use std::sync::Arc;
        use std::thread;

        let halt = Arc::new(Halt::new());
        let before = halt.ticket();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let halt = Arc::clone(&halt);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        halt.trigger();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(halt.is_triggered(before));
        assert_eq!(halt.generation.load(Ordering::SeqCst), 4000);
    }
}
