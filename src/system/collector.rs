use anyhow::{bail, Result};
use sysinfo::{Components, System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::error::Error;
use crate::system::provider::{MetricsProvider, RawSample, StaticInfo};
use crate::system::sensor::TemperatureSensor;

/// Host metrics provider backed by the `sysinfo` crate
pub struct SysinfoProvider {
    sys: System,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();

        // Need an initial CPU measurement for deltas
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_all();

        Self { sys }
    }

    fn average_frequency(&self) -> Option<f64> {
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return None;
        }
        let mean = cpus.iter().map(|c| c.frequency() as f64).sum::<f64>() / cpus.len() as f64;
        if mean > 0.0 {
            Some(mean)
        } else {
            None
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn core_counts(&self) -> Result<(usize, usize)> {
        let logical = self.sys.cpus().len();
        if logical == 0 {
            bail!("sysinfo reported no CPUs");
        }
        let physical = match self.sys.physical_core_count() {
            Some(n) => n,
            None => bail!("physical core count is not available on this host"),
        };
        Ok((physical, logical))
    }

    fn static_info(&self) -> StaticInfo {
        let name = self
            .sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty());

        StaticInfo {
            name,
            nominal_clock_mhz: nominal_clock_mhz(),
        }
    }

    fn sample_utilization(&mut self) -> Result<Vec<f32>> {
        // Usage and frequency come from the same refresh
        self.sys.refresh_cpu_all();
        Ok(self.sys.cpus().iter().map(|c| c.cpu_usage()).collect())
    }

    /// Frequency captured by the most recent utilization refresh
    fn sample_frequency(&mut self) -> Option<f64> {
        self.average_frequency()
    }

    fn sample(&mut self) -> Result<RawSample> {
        let utilization = self.sample_utilization()?;
        Ok(RawSample {
            utilization,
            frequency_mhz: self.average_frequency(),
        })
    }
}

/// Base clock from cpufreq sysfs (values are in kHz)
#[cfg(target_os = "linux")]
fn nominal_clock_mhz() -> Option<f64> {
    const CANDIDATES: [&str; 2] = [
        "/sys/devices/system/cpu/cpu0/cpufreq/base_frequency",
        "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq",
    ];

    for path in CANDIDATES {
        match std::fs::read_to_string(path) {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(khz) if khz > 0 => return Some(khz as f64 / 1000.0),
                Ok(_) => {}
                Err(e) => tracing::debug!(path, error = %e, "Unparseable cpufreq value"),
            },
            Err(e) => tracing::debug!(path, error = %e, "cpufreq entry not readable"),
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn nominal_clock_mhz() -> Option<f64> {
    None
}

/// Per-core temperatures from `sysinfo` components labelled like "coretemp Core 3".
///
/// The N in "Core N" is a physical core id and ids can be sparse (0, 1, 4, 5
/// on some parts), so readings are returned in ascending id order: entry `k`
/// belongs to the k-th physical core. SMT siblings share their core's sensor
/// and have no entry of their own.
pub struct SysinfoSensor {
    components: Components,
}

impl SysinfoSensor {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureSensor for SysinfoSensor {
    fn core_temperatures(&mut self) -> crate::Result<Vec<Option<f32>>> {
        self.components.refresh(false);

        let readings = self.components.list().iter().filter_map(|component| {
            let index = core_index(component.label())?;
            let celsius = component.temperature().filter(|t| t.is_finite())?;
            Some((index, celsius))
        });
        let temps = by_core_order(readings);

        if temps.is_empty() {
            return Err(Error::SensorUnavailable("no per-core temperature components".into()));
        }
        Ok(temps)
    }
}

/// Orders `(core id, celsius)` pairs by core id; a repeated id keeps its first value
fn by_core_order(readings: impl IntoIterator<Item = (usize, f32)>) -> Vec<Option<f32>> {
    let mut by_id: Vec<(usize, f32)> = Vec::new();
    for (id, celsius) in readings {
        if !by_id.iter().any(|(seen, _)| *seen == id) {
            by_id.push((id, celsius));
        }
    }
    by_id.sort_by_key(|(id, _)| *id);
    by_id.into_iter().map(|(_, celsius)| Some(celsius)).collect()
}

/// Extracts N from labels such as "coretemp Core 3" or "Core 3"
fn core_index(label: &str) -> Option<usize> {
    let lower = label.to_ascii_lowercase();
    let pos = lower.find("core ")?;
    lower[pos + "core ".len()..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|digits| digits.parse().ok())
}
