//! Named sample positions and the sample tour.
//!
//! The stage visits samples in the order the configuration lists them.

mod registry;
mod tour;

pub use registry::{Sample, SampleRegistry};
pub use tour::{SampleTour, TourStep};
