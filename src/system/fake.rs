use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use crate::error::{Error, Result};
use crate::system::provider::{MetricsProvider, StaticInfo};
use crate::system::sensor::TemperatureSensor;

/// One scripted answer to `sample_utilization`.
pub struct FakeSample {
    response: anyhow::Result<Vec<f32>>,
    delay: Option<Duration>,
}

impl FakeSample {
    pub fn ok(utilization: Vec<f32>) -> Self {
        Self { response: Ok(utilization), delay: None }
    }

    pub fn err(message: &str) -> Self {
        Self { response: Err(anyhow!(message.to_string())), delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Scriptable metrics provider for tests and demos.
///
/// Scripted samples are answered in order; once the script runs out every
/// call returns the steady vector.
pub struct FakeMetricsProvider {
    counts: std::result::Result<(usize, usize), String>,
    info: StaticInfo,
    script: VecDeque<FakeSample>,
    steady: Vec<f32>,
    frequency_mhz: Option<f64>,
    calls: Arc<AtomicUsize>,
}

impl FakeMetricsProvider {
    pub fn new(physical: usize, logical: usize) -> Self {
        Self {
            counts: Ok((physical, logical)),
            info: StaticInfo {
                name: Some("Fake CPU @ 3.00GHz".into()),
                nominal_clock_mhz: Some(3000.0),
            },
            script: VecDeque::new(),
            steady: (0..logical).map(|i| (i * 10 % 100) as f32).collect(),
            frequency_mhz: Some(2900.0),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_static_info(mut self, info: StaticInfo) -> Self {
        self.info = info;
        self
    }

    pub fn failing_core_counts(mut self, message: &str) -> Self {
        self.counts = Err(message.to_string());
        self
    }

    pub fn with_script(mut self, script: Vec<FakeSample>) -> Self {
        self.script = script.into();
        self
    }

    pub fn with_steady(mut self, utilization: Vec<f32>) -> Self {
        self.steady = utilization;
        self
    }

    pub fn with_frequency(mut self, frequency_mhz: Option<f64>) -> Self {
        self.frequency_mhz = frequency_mhz;
        self
    }

    /// Shared counter of `sample_utilization` calls; stays valid after the
    /// provider has been moved into a sampler.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl MetricsProvider for FakeMetricsProvider {
    fn core_counts(&self) -> anyhow::Result<(usize, usize)> {
        self.counts.clone().map_err(|e| anyhow!(e))
    }

    fn static_info(&self) -> StaticInfo {
        self.info.clone()
    }

    fn sample_utilization(&mut self) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(entry) => {
                if let Some(delay) = entry.delay {
                    std::thread::sleep(delay);
                }
                entry.response
            }
            None => Ok(self.steady.clone()),
        }
    }

    fn sample_frequency(&mut self) -> Option<f64> {
        self.frequency_mhz
    }
}

/// Fixed-answer temperature sensor
#[derive(Debug, Clone, Default)]
pub struct FakeSensor {
    temps: Option<Vec<Option<f32>>>,
}

impl FakeSensor {
    pub fn new(temps: Vec<Option<f32>>) -> Self {
        Self { temps: Some(temps) }
    }

    /// A sensor that always reports `SensorUnavailable`
    pub fn unavailable() -> Self {
        Self { temps: None }
    }
}

impl TemperatureSensor for FakeSensor {
    fn core_temperatures(&mut self) -> Result<Vec<Option<f32>>> {
        self.temps
            .clone()
            .ok_or_else(|| Error::SensorUnavailable("fake sensor disabled".into()))
    }
}
