//! Host-facing side of the sampling engine: topology, metrics provider,
//! temperature sensor and the snapshot data model.

pub mod collector;
pub mod fake;
pub mod provider;
pub mod sensor;
pub mod snapshot;
pub mod topology;

pub use collector::{SysinfoProvider, SysinfoSensor};
pub use provider::{MetricsProvider, RawSample, StaticInfo};
pub use sensor::{FallbackPolicy, TemperatureFallback, TemperatureSensor};
pub use snapshot::{CoreReading, Snapshot, Temperature, TemperatureSource};
pub use topology::TopologyDescriptor;
