//! Sample registry for named stage positions.

use heapless::{FnvIndexMap, String};

use crate::config::{StageConfig, MAX_SAMPLES};
use crate::error::SampleError;
use crate::motion::Position;

/// Name and position of one registered sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    /// Registered name.
    pub name: &'a str,
    /// 1-based place in the tour.
    pub number: usize,
    /// Stage position in millimeters.
    pub position: Position,
}

/// Named sample positions in tour order.
#[derive(Debug, Clone, Default)]
pub struct SampleRegistry {
    samples: FnvIndexMap<String<32>, Position, MAX_SAMPLES>,
}

impl SampleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the configured samples.
    pub fn from_config(config: &StageConfig) -> Self {
        Self {
            samples: config.samples.clone(),
        }
    }

    /// Append a sample at the end of the tour, or move an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is too long or the registry is full.
    pub fn register(&mut self, name: &str, position: Position) -> Result<(), SampleError> {
        let key = String::try_from(name).map_err(|_| SampleError::NameTooLong)?;
        self.samples
            .insert(key, position)
            .map_err(|_| SampleError::RegistryFull)?;
        Ok(())
    }

    /// Look a sample up by name.
    ///
    /// # Errors
    ///
    /// [`SampleError::UnknownSample`] if no such sample is registered.
    pub fn get(&self, name: &str) -> Result<Sample<'_>, SampleError> {
        self.samples
            .iter()
            .position(|(k, _)| k.as_str() == name)
            .and_then(|index| self.at(index))
            .ok_or_else(|| unknown(name))
    }

    /// Sample at a 0-based tour index.
    pub fn at(&self, index: usize) -> Option<Sample<'_>> {
        self.samples.iter().nth(index).map(|(name, position)| Sample {
            name: name.as_str(),
            number: index + 1,
            position: *position,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample is registered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample names in tour order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(|s| s.as_str())
    }
}

fn unknown(name: &str) -> SampleError {
    let mut shown = String::new();
    for c in name.chars() {
        if shown.push(c).is_err() {
            break;
        }
    }
    SampleError::UnknownSample(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerAxis;

    fn registry() -> SampleRegistry {
        let mut registry = SampleRegistry::new();
        registry.register("lpf_1", PerAxis::new(2.0, 2.0, 0.0)).unwrap();
        registry.register("lpf_2", PerAxis::new(8.0, 2.0, 0.0)).unwrap();
        registry.register("hpf_1", PerAxis::new(1.0, 1.0, 0.0)).unwrap();
        registry
    }

    #[test]
    fn test_lookup_keeps_tour_order() {
        let registry = registry();
        let sample = registry.get("lpf_2").unwrap();
        assert_eq!(sample.number, 2);
        assert_eq!(sample.position, PerAxis::new(8.0, 2.0, 0.0));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["lpf_1", "lpf_2", "hpf_1"]);
        assert_eq!(registry.at(2).map(|s| s.name), Some("hpf_1"));
        assert!(registry.at(3).is_none());
    }

    #[test]
    fn test_unknown_sample() {
        assert_eq!(
            registry().get("hpf_9"),
            Err(SampleError::UnknownSample(String::try_from("hpf_9").unwrap()))
        );
    }

    #[test]
    fn test_name_too_long() {
        let mut registry = SampleRegistry::new();
        let long = "a".repeat(40);
        assert_eq!(
            registry.register(&long, PerAxis::new(0.0, 0.0, 0.0)),
            Err(SampleError::NameTooLong)
        );
        assert!(matches!(registry.get(&long), Err(SampleError::UnknownSample(s)) if s.len() == 32));
    }

    #[test]
    fn test_from_config() {
        let mut config = StageConfig::default();
        let _ = config
            .samples
            .insert(String::try_from("hpf_1").unwrap(), PerAxis::new(1.0, 1.0, 0.0));

        let registry = SampleRegistry::from_config(&config);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("hpf_1").is_ok());
    }
}
