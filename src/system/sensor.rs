use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::system::snapshot::Temperature;

/// Plausible idle-to-loaded range used when a temperature has to be synthesized
pub const SIMULATED_RANGE_C: Range<f32> = 35.0..70.0;

/// Optional per-core temperature capability.
pub trait TemperatureSensor: Send {
    /// Celsius per physical core, in physical core order. Entries may be
    /// `None` or missing past the end. Fails with `SensorUnavailable` when
    /// nothing could be read at all.
    fn core_temperatures(&mut self) -> Result<Vec<Option<f32>>>;
}

impl<S: TemperatureSensor + ?Sized> TemperatureSensor for Box<S> {
    fn core_temperatures(&mut self) -> Result<Vec<Option<f32>>> {
        (**self).core_temperatures()
    }
}

/// What a reading gets when the sensor has no value for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Uniform value in [`SIMULATED_RANGE_C`], flagged as fallback
    Simulated { seed: Option<u64> },
    /// Leave the temperature out
    Absent,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Simulated { seed: None }
    }
}

/// Produces fallback temperatures according to a [`FallbackPolicy`].
///
/// A seeded policy yields the same sequence on every run.
pub struct TemperatureFallback {
    rng: Option<StdRng>,
}

impl TemperatureFallback {
    pub fn new(policy: FallbackPolicy) -> Self {
        let rng = match policy {
            FallbackPolicy::Simulated { seed: Some(seed) } => Some(StdRng::seed_from_u64(seed)),
            FallbackPolicy::Simulated { seed: None } => Some(StdRng::from_os_rng()),
            FallbackPolicy::Absent => None,
        };
        Self { rng }
    }

    pub fn next(&mut self) -> Option<Temperature> {
        self.rng
            .as_mut()
            .map(|rng| Temperature::fallback(rng.random_range(SIMULATED_RANGE_C)))
    }

    /// Sensor value for `index` when present, otherwise the fallback
    pub fn resolve(&mut self, sensed: Option<&[Option<f32>]>, index: usize) -> Option<Temperature> {
        match sensed.and_then(|temps| temps.get(index).copied().flatten()) {
            Some(celsius) => Some(Temperature::sensor(celsius)),
            None => self.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::TemperatureSource;

    #[test]
    fn seeded_fallback_is_reproducible_and_in_range() {
        let mut a = TemperatureFallback::new(FallbackPolicy::Simulated { seed: Some(7) });
        let mut b = TemperatureFallback::new(FallbackPolicy::Simulated { seed: Some(7) });
        for _ in 0..64 {
            let ta = a.next().unwrap();
            let tb = b.next().unwrap();
            assert_eq!(ta, tb);
            assert!(SIMULATED_RANGE_C.contains(&ta.celsius));
            assert_eq!(ta.source, TemperatureSource::Fallback);
        }
    }

    #[test]
    fn absent_policy_yields_nothing() {
        let mut fallback = TemperatureFallback::new(FallbackPolicy::Absent);
        assert_eq!(fallback.next(), None);
        assert_eq!(fallback.resolve(None, 0), None);
    }

    #[test]
    fn sensor_values_win_over_fallback() {
        let mut fallback = TemperatureFallback::new(FallbackPolicy::Simulated { seed: Some(1) });
        let sensed = [Some(48.0), None];
        assert_eq!(fallback.resolve(Some(&sensed), 0), Some(Temperature::sensor(48.0)));
        assert!(fallback.resolve(Some(&sensed), 1).unwrap().is_fallback());
        assert!(fallback.resolve(Some(&sensed), 5).unwrap().is_fallback());
    }
}
