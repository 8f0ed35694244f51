use std::sync::Arc;

use chrono::Local;

use crate::error::{Error, Result, SampleFailure};
use crate::system::sensor::{FallbackPolicy, TemperatureFallback, TemperatureSensor};
use crate::system::snapshot::{CoreReading, Snapshot};
use crate::system::{MetricsProvider, TopologyDescriptor};

/// Turns one provider reading into a [`Snapshot`] shaped by the fixed topology.
pub struct Sampler {
    provider: Box<dyn MetricsProvider>,
    sensor: Option<Box<dyn TemperatureSensor>>,
    fallback: TemperatureFallback,
    next_sequence: u64,
    sensor_reported: bool,
}

impl Sampler {
    pub fn new(provider: impl MetricsProvider + 'static, fallback: FallbackPolicy) -> Self {
        Self {
            provider: Box::new(provider),
            sensor: None,
            fallback: TemperatureFallback::new(fallback),
            next_sequence: 0,
            sensor_reported: false,
        }
    }

    pub fn with_sensor(mut self, sensor: impl TemperatureSensor + 'static) -> Self {
        self.sensor = Some(Box::new(sensor));
        self
    }

    /// Takes one sample. Never returns a partially filled snapshot and never
    /// retries; a failure is reported as [`Error::SampleFailed`].
    pub fn sample(&mut self, topology: &Arc<TopologyDescriptor>) -> Result<Snapshot> {
        let raw = self.provider.sample().map_err(SampleFailure::Provider)?;

        let expected = topology.logical_core_count;
        if raw.utilization.len() < expected {
            return Err(SampleFailure::ShortVector { expected, got: raw.utilization.len() }.into());
        }

        let sensed = self.read_sensor();
        let sensed = sensed.as_deref();

        // Sensor entries are per physical core; logical slots past the
        // physical count have no sensor of their own and take the fallback
        let logical: Vec<CoreReading> = (0..topology.logical_core_count)
            .map(|i| {
                let sensed = sensed.filter(|_| i < topology.physical_core_count);
                CoreReading::new(i, raw.utilization[i], self.fallback.resolve(sensed, i))
            })
            .collect();

        // Physical core i reads logical slot i of the same vector
        let physical: Vec<CoreReading> = (0..topology.physical_core_count)
            .map(|i| CoreReading::new(i, raw.utilization[i], self.fallback.resolve(sensed, i)))
            .collect();

        let frequency = raw.frequency_mhz.filter(|mhz| mhz.is_finite() && *mhz > 0.0);
        let snapshot = Snapshot::new(
            self.next_sequence,
            Local::now(),
            Arc::clone(topology),
            frequency,
            physical,
            logical,
        )
        .ok_or(SampleFailure::ShortVector { expected, got: raw.utilization.len() })?;

        self.next_sequence += 1;
        Ok(snapshot)
    }

    fn read_sensor(&mut self) -> Option<Vec<Option<f32>>> {
        let sensor = self.sensor.as_mut()?;
        match sensor.core_temperatures() {
            Ok(temps) => Some(temps),
            Err(e @ Error::SensorUnavailable(_)) => {
                if !self.sensor_reported {
                    tracing::warn!(error = %e, "Falling back for core temperatures");
                    self.sensor_reported = true;
                }
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Temperature sensor error");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fake::{FakeMetricsProvider, FakeSample, FakeSensor};
    use crate::system::snapshot::TemperatureSource;
    use crate::system::StaticInfo;

    fn topology_for(provider: &FakeMetricsProvider) -> Arc<TopologyDescriptor> {
        Arc::new(TopologyDescriptor::resolve(provider).unwrap())
    }

    #[test]
    fn maps_flat_vector_onto_both_sequences() {
        let provider = FakeMetricsProvider::new(4, 8)
            .with_steady(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);

        let snap = sampler.sample(&topology).unwrap();
        let physical: Vec<f32> = snap.physical_readings().iter().map(|c| c.utilization_percent).collect();
        let logical: Vec<f32> = snap.logical_readings().iter().map(|c| c.utilization_percent).collect();
        assert_eq!(physical, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(logical, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]);
        assert_eq!(snap.current_frequency_mhz(), Some(2900.0));
        assert!(snap.physical_readings().iter().all(|c| c.temperature.is_none()));
    }

    #[test]
    fn short_vector_fails_without_partial_snapshot() {
        let provider = FakeMetricsProvider::new(4, 8).with_script(vec![FakeSample::ok(vec![1.0; 7])]);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);

        let err = sampler.sample(&topology).unwrap_err();
        assert!(matches!(
            err,
            Error::SampleFailed(SampleFailure::ShortVector { expected: 8, got: 7 })
        ));
    }

    #[test]
    fn longer_vector_is_truncated_to_topology() {
        let provider = FakeMetricsProvider::new(1, 2).with_steady(vec![1.0, 2.0, 3.0, 4.0]);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);
        assert_eq!(sampler.sample(&topology).unwrap().logical_readings().len(), 2);
    }

    #[test]
    fn provider_error_is_sample_failure() {
        let provider = FakeMetricsProvider::new(2, 2).with_script(vec![FakeSample::err("pdh query failed")]);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);

        let err = sampler.sample(&topology).unwrap_err();
        assert!(matches!(err, Error::SampleFailed(SampleFailure::Provider(_))));
        assert!(err.to_string().contains("pdh query failed"));
    }

    #[test]
    fn sequence_advances_only_on_success() {
        let provider = FakeMetricsProvider::new(1, 1).with_script(vec![
            FakeSample::ok(vec![1.0]),
            FakeSample::err("flaky"),
            FakeSample::ok(vec![2.0]),
        ]);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);

        assert_eq!(sampler.sample(&topology).unwrap().sequence(), 0);
        assert!(sampler.sample(&topology).is_err());
        assert_eq!(sampler.sample(&topology).unwrap().sequence(), 1);
    }

    #[test]
    fn sensor_readings_and_fallback_are_flagged() {
        let provider = FakeMetricsProvider::new(2, 4);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Simulated { seed: Some(42) })
            .with_sensor(FakeSensor::new(vec![Some(51.0), None]));

        let snap = sampler.sample(&topology).unwrap();
        let logical = snap.logical_readings();
        assert_eq!(logical[0].temperature.unwrap().source, TemperatureSource::Sensor);
        assert_eq!(logical[0].temperature.unwrap().celsius, 51.0);
        for reading in &logical[1..] {
            assert_eq!(reading.temperature.unwrap().source, TemperatureSource::Fallback);
        }
        assert!(snap.has_fallback_temperatures());
    }

    #[test]
    fn logical_cores_past_physical_count_never_borrow_a_sensor() {
        let provider = FakeMetricsProvider::new(2, 4);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent)
            .with_sensor(FakeSensor::new(vec![Some(40.0), Some(41.0), Some(42.0), Some(43.0)]));

        let snap = sampler.sample(&topology).unwrap();
        let physical: Vec<_> = snap.physical_readings().iter().map(|c| c.temperature.map(|t| t.celsius)).collect();
        let logical: Vec<_> = snap.logical_readings().iter().map(|c| c.temperature.map(|t| t.celsius)).collect();
        assert_eq!(physical, vec![Some(40.0), Some(41.0)]);
        assert_eq!(logical, vec![Some(40.0), Some(41.0), None, None]);
    }

    #[test]
    fn unavailable_sensor_degrades_to_fallback() {
        let provider = FakeMetricsProvider::new(2, 2);
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Simulated { seed: Some(3) })
            .with_sensor(FakeSensor::unavailable());

        let snap = sampler.sample(&topology).unwrap();
        assert!(snap.logical_readings().iter().all(|c| c.temperature.unwrap().is_fallback()));
    }

    #[test]
    fn missing_frequency_and_nominal_clock_are_tolerated() {
        let provider = FakeMetricsProvider::new(2, 2)
            .with_frequency(None)
            .with_static_info(StaticInfo { name: Some("Mystery".into()), nominal_clock_mhz: None });
        let topology = topology_for(&provider);
        let mut sampler = Sampler::new(provider, FallbackPolicy::Absent);

        let snap = sampler.sample(&topology).unwrap();
        assert_eq!(snap.current_frequency_mhz(), None);
        assert_eq!(snap.topology().nominal_clock_mhz, None);
    }
}
