use thiserror::Error;

/// Configuration errors. Every variant is fatal to the run that raised it and
/// is returned before any replication executes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("{name} must be a positive finite rate, got {value}")]
    NonPositiveRate { name: &'static str, value: f64 },

    #[error("simulation horizon must be positive and finite, got {0}")]
    NonPositiveHorizon(f64),

    #[error("unstable queue: service rate mu={mu} must exceed arrival rate lambda={lambda}")]
    Unstable { lambda: f64, mu: f64 },

    #[error("at least 2 replications are required to estimate a confidence interval, got {0}")]
    InsufficientReplications(usize),

    #[error("horizon {horizon} at lambda={lambda} yields no customers per replication")]
    NoCustomers { horizon: f64, lambda: f64 },

    #[error("a replication needs at least one customer")]
    EmptyReplication,

    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("draw sequences differ in length: {gaps} interarrival gaps, {services} service times")]
    MismatchedDraws { gaps: usize, services: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;

pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::NonPositiveRate { name, value })
    }
}
