use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::system::topology::TopologyDescriptor;

/// Where a temperature value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureSource {
    /// Read from a hardware sensor
    Sensor,
    /// Synthesized by the fallback policy because no sensor value existed
    Fallback,
}

/// A per-core temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub celsius: f32,
    pub source: TemperatureSource,
}

impl Temperature {
    pub fn sensor(celsius: f32) -> Self {
        Self { celsius, source: TemperatureSource::Sensor }
    }

    pub fn fallback(celsius: f32) -> Self {
        Self { celsius, source: TemperatureSource::Fallback }
    }

    pub fn fahrenheit(&self) -> f32 {
        self.celsius * 9.0 / 5.0 + 32.0
    }

    pub fn is_fallback(&self) -> bool {
        self.source == TemperatureSource::Fallback
    }
}

/// One core's reading inside a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CoreReading {
    pub index: usize,
    /// Always within 0.0..=100.0
    pub utilization_percent: f32,
    pub temperature: Option<Temperature>,
}

impl CoreReading {
    pub fn new(index: usize, utilization_percent: f32, temperature: Option<Temperature>) -> Self {
        Self {
            index,
            utilization_percent: clamp_percent(utilization_percent),
            temperature,
        }
    }
}

/// An immutable, internally consistent bundle of per-core metrics taken at one instant.
///
/// Fields are private so a delivered snapshot cannot be patched in place; build
/// one with [`Snapshot::new`], which checks the reading sequences against the
/// topology.
#[derive(Debug, Clone)]
pub struct Snapshot {
    sequence: u64,
    timestamp: DateTime<Local>,
    topology: Arc<TopologyDescriptor>,
    current_frequency_mhz: Option<f64>,
    physical: Vec<CoreReading>,
    logical: Vec<CoreReading>,
}

impl Snapshot {
    /// Returns `None` when either reading sequence does not match the topology
    /// length or is not indexed `0..len` in order.
    pub fn new(
        sequence: u64,
        timestamp: DateTime<Local>,
        topology: Arc<TopologyDescriptor>,
        current_frequency_mhz: Option<f64>,
        physical: Vec<CoreReading>,
        logical: Vec<CoreReading>,
    ) -> Option<Self> {
        if physical.len() != topology.physical_core_count
            || logical.len() != topology.logical_core_count
            || !is_dense(&physical)
            || !is_dense(&logical)
        {
            return None;
        }

        Some(Self {
            sequence,
            timestamp,
            topology,
            current_frequency_mhz,
            physical,
            logical,
        })
    }

    /// Renumbers a snapshot before delivery
    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Position of this snapshot in the sampler's output order; the
    /// scheduler renumbers to delivery order
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn topology(&self) -> &Arc<TopologyDescriptor> {
        &self.topology
    }

    pub fn current_frequency_mhz(&self) -> Option<f64> {
        self.current_frequency_mhz
    }

    pub fn physical_readings(&self) -> &[CoreReading] {
        &self.physical
    }

    pub fn logical_readings(&self) -> &[CoreReading] {
        &self.logical
    }

    /// Mean utilization across logical cores
    pub fn average_utilization(&self) -> f32 {
        if self.logical.is_empty() {
            0.0
        } else {
            self.logical.iter().map(|c| c.utilization_percent).sum::<f32>() / self.logical.len() as f32
        }
    }

    /// True when any reading carries a synthesized temperature
    pub fn has_fallback_temperatures(&self) -> bool {
        self.physical
            .iter()
            .chain(self.logical.iter())
            .any(|c| c.temperature.map_or(false, |t| t.is_fallback()))
    }
}

fn is_dense(readings: &[CoreReading]) -> bool {
    readings.iter().enumerate().all(|(i, r)| r.index == i)
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
