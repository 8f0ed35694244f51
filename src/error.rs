use std::time::Duration;

/// Crate-wide result alias for the sampling engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the sampling-and-refresh engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The core index space could not be established at startup. Fatal.
    #[error("CPU topology unavailable: {0}")]
    TopologyUnavailable(String),

    /// One sample could not be taken. The scheduler recovers on the next tick.
    #[error("sample failed: {0}")]
    SampleFailed(#[from] SampleFailure),

    /// No temperature could be read; readings fall back to the configured policy.
    #[error("temperature sensor unavailable: {0}")]
    SensorUnavailable(String),
}

/// Why a single sample failed.
#[derive(Debug, thiserror::Error)]
pub enum SampleFailure {
    #[error("metrics provider error: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("metrics provider timed out after {0:?}")]
    Timeout(Duration),

    /// A timed-out provider call has not returned yet; nothing was requested.
    #[error("previous sample is still running")]
    Busy,

    #[error("provider returned {got} utilization values, expected {expected}")]
    ShortVector { expected: usize, got: usize },
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::TopologyUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_vector_message_names_both_lengths() {
        let err = Error::from(SampleFailure::ShortVector { expected: 8, got: 7 });
        assert_eq!(
            err.to_string(),
            "sample failed: provider returned 7 utilization values, expected 8"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn provider_failure_keeps_its_source() {
        let err = Error::from(SampleFailure::Provider(anyhow::anyhow!("counter read failed")));
        let source = std::error::Error::source(&err).expect("sample failure source");
        assert!(source.to_string().contains("counter read failed"));
    }

    #[test]
    fn only_topology_errors_are_fatal() {
        assert!(Error::TopologyUnavailable("no cpus".into()).is_fatal());
        assert!(!Error::SensorUnavailable("no coretemp".into()).is_fatal());
    }
}
