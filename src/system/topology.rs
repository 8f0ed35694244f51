use crate::error::{Error, Result};
use crate::system::provider::MetricsProvider;

/// Fixed core layout and identity of the host CPU, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyDescriptor {
    pub physical_core_count: usize,
    pub logical_core_count: usize,
    /// `None` when the host does not report a model name
    pub cpu_name: Option<String>,
    /// Base/nominal clock, `None` when unknown
    pub nominal_clock_mhz: Option<f64>,
}

impl TopologyDescriptor {
    /// Builds a descriptor, enforcing `logical >= physical >= 1`.
    pub fn new(
        physical_core_count: usize,
        logical_core_count: usize,
        cpu_name: Option<String>,
        nominal_clock_mhz: Option<f64>,
    ) -> Result<Self> {
        if physical_core_count == 0 || logical_core_count == 0 {
            return Err(Error::TopologyUnavailable(format!(
                "core counts must be non-zero (physical {physical_core_count}, logical {logical_core_count})"
            )));
        }
        if logical_core_count < physical_core_count {
            return Err(Error::TopologyUnavailable(format!(
                "{physical_core_count} physical cores reported but only {logical_core_count} logical"
            )));
        }

        Ok(Self {
            physical_core_count,
            logical_core_count,
            cpu_name: cpu_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            nominal_clock_mhz: nominal_clock_mhz.filter(|mhz| mhz.is_finite() && *mhz > 0.0),
        })
    }

    /// Queries the provider's static-info capability. Missing core counts are
    /// fatal; a missing name or nominal clock is not.
    pub fn resolve(provider: &dyn MetricsProvider) -> Result<Self> {
        let (physical, logical) = provider
            .core_counts()
            .map_err(|e| Error::TopologyUnavailable(format!("{e:#}")))?;
        let info = provider.static_info();

        let topology = Self::new(physical, logical, info.name, info.nominal_clock_mhz)?;
        tracing::info!(
            physical = topology.physical_core_count,
            logical = topology.logical_core_count,
            name = topology.display_name(),
            nominal_mhz = ?topology.nominal_clock_mhz,
            "Resolved CPU topology"
        );
        Ok(topology)
    }

    pub fn display_name(&self) -> &str {
        self.cpu_name.as_deref().unwrap_or("Unknown CPU")
    }

    /// True when logical cores outnumber physical ones (SMT / hyperthreading)
    pub fn has_smt(&self) -> bool {
        self.logical_core_count > self.physical_core_count
    }
}
