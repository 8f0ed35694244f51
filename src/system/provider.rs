use anyhow::Result;

/// Identifying metadata that does not change while the process runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticInfo {
    pub name: Option<String>,
    pub nominal_clock_mhz: Option<f64>,
}

/// Raw output of one provider sample: a flat per-logical-core utilization
/// vector and the aggregate clock, captured together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub utilization: Vec<f32>,
    pub frequency_mhz: Option<f64>,
}

/// Source of raw CPU metrics.
///
/// Implementations must answer `sample_utilization` for all logical cores in a
/// single call so the values describe one point in time.
pub trait MetricsProvider: Send {
    /// `(physical, logical)` core counts
    fn core_counts(&self) -> Result<(usize, usize)>;

    fn static_info(&self) -> StaticInfo;

    /// Utilization percentage for every logical core, indexed by core number
    fn sample_utilization(&mut self) -> Result<Vec<f32>>;

    /// Current aggregate/average clock, `None` without a frequency sensor
    fn sample_frequency(&mut self) -> Option<f64>;

    /// Takes utilization and frequency as one step.
    fn sample(&mut self) -> Result<RawSample> {
        let utilization = self.sample_utilization()?;
        let frequency_mhz = self.sample_frequency();
        Ok(RawSample { utilization, frequency_mhz })
    }
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for Box<P> {
    fn core_counts(&self) -> Result<(usize, usize)> {
        (**self).core_counts()
    }

    fn static_info(&self) -> StaticInfo {
        (**self).static_info()
    }

    fn sample_utilization(&mut self) -> Result<Vec<f32>> {
        (**self).sample_utilization()
    }

    fn sample_frequency(&mut self) -> Option<f64> {
        (**self).sample_frequency()
    }

    fn sample(&mut self) -> Result<RawSample> {
        (**self).sample()
    }
}
