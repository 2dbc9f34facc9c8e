//! Cursor over the sample registry.

use crate::error::SampleError;

use super::registry::{Sample, SampleRegistry};

/// Where a tour step ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TourStep<'a> {
    /// Positioned at this sample.
    At(Sample<'a>),
    /// Past the last sample; the cursor stays on it.
    Complete,
}

/// Tracks the sample the stage was last sent to.
///
/// The cursor only moves once the caller reports the motion succeeded, so a
/// failed move leaves the tour where it was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleTour {
    current: Option<usize>,
}

impl SampleTour {
    /// A tour that has not started.
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Index of the current sample.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// The current sample, if any.
    pub fn current_sample<'r>(&self, registry: &'r SampleRegistry) -> Option<Sample<'r>> {
        self.current.and_then(|index| registry.at(index))
    }

    /// First sample of the tour.
    ///
    /// # Errors
    ///
    /// [`SampleError::TourNotStarted`] if the registry is empty.
    pub fn first<'r>(&self, registry: &'r SampleRegistry) -> Result<Sample<'r>, SampleError> {
        registry.at(0).ok_or(SampleError::TourNotStarted)
    }

    /// Sample after the current one.
    ///
    /// # Errors
    ///
    /// [`SampleError::TourNotStarted`] if no sample was reached yet.
    pub fn next<'r>(&self, registry: &'r SampleRegistry) -> Result<TourStep<'r>, SampleError> {
        let current = self.current.ok_or(SampleError::TourNotStarted)?;
        Ok(registry
            .at(current + 1)
            .map_or(TourStep::Complete, TourStep::At))
    }

    /// Record that the stage reached `sample`.
    pub fn arrived(&mut self, sample: &Sample<'_>) {
        self.current = Some(sample.number - 1);
    }

    /// Forget the current sample.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerAxis;

    fn registry() -> SampleRegistry {
        let mut registry = SampleRegistry::new();
        registry.register("lpf_1", PerAxis::new(2.0, 2.0, 0.0)).unwrap();
        registry.register("lpf_2", PerAxis::new(8.0, 2.0, 0.0)).unwrap();
        registry
    }

    #[test]
    fn test_next_requires_start() {
        let tour = SampleTour::new();
        assert_eq!(tour.next(&registry()), Err(SampleError::TourNotStarted));
        assert_eq!(
            tour.first(&SampleRegistry::new()),
            Err(SampleError::TourNotStarted)
        );
    }

    #[test]
    fn test_walks_to_completion() {
        let registry = registry();
        let mut tour = SampleTour::new();

        let first = tour.first(&registry).unwrap();
        assert_eq!(first.name, "lpf_1");
        tour.arrived(&first);

        let TourStep::At(second) = tour.next(&registry).unwrap() else {
            panic!("expected a second sample");
        };
        assert_eq!(second.name, "lpf_2");
        tour.arrived(&second);

        assert_eq!(tour.next(&registry), Ok(TourStep::Complete));
        assert_eq!(tour.current_sample(&registry).map(|s| s.name), Some("lpf_2"));

        tour.reset();
        assert_eq!(tour.current(), None);
    }

    #[test]
    fn test_unconfirmed_step_does_not_advance() {
        let registry = registry();
        let mut tour = SampleTour::new();
        tour.arrived(&tour.first(&registry).unwrap());

        let _ = tour.next(&registry).unwrap();
        assert_eq!(tour.current(), Some(0));
    }
}
