use crate::error::{check_rate, Result, SimError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    /// Arrival rate, customers per unit time.
    pub lambda: f64,
    /// Service rate, customers per unit time while the server is busy.
    pub mu: f64,
    /// Horizon in time units; each replication serves `floor(horizon * lambda)` customers.
    pub horizon: f64,
    pub replications: usize,
    /// Master seed. `None` draws one from entropy at run time.
    pub seed: Option<u64>,
    pub confidence: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "mm1".to_string(),
            lambda: 3.0,
            mu: 4.0,
            horizon: 500.0,
            replications: 30,
            seed: None,
            confidence: 0.95,
        }
    }
}

impl SimConfig {
    pub fn new(lambda: f64, mu: f64, horizon: f64, replications: usize) -> Self {
        Self {
            lambda,
            mu,
            horizon,
            replications,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_replications(mut self, replications: usize) -> Self {
        self.replications = replications;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Number of customers simulated in every replication.
    pub fn customers_per_replication(&self) -> usize {
        (self.horizon * self.lambda).floor() as usize
    }

    /// Offered load, lambda / mu.
    pub fn rho(&self) -> f64 {
        self.lambda / self.mu
    }

    /// Checks every precondition of a run, in the order rates, horizon,
    /// stability, replications, customer count, confidence.
    pub fn validate(&self) -> Result<()> {
        check_rate("lambda", self.lambda)?;
        check_rate("mu", self.mu)?;

        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimError::NonPositiveHorizon(self.horizon));
        }
        if self.mu <= self.lambda {
            return Err(SimError::Unstable {
                lambda: self.lambda,
                mu: self.mu,
            });
        }
        if self.replications < 2 {
            return Err(SimError::InsufficientReplications(self.replications));
        }
        if self.customers_per_replication() < 1 {
            return Err(SimError::NoCustomers {
                horizon: self.horizon,
                lambda: self.lambda,
            });
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(SimError::InvalidConfidence(self.confidence));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_scenario() {
        let config = SimConfig::default();
        assert_eq!(config.customers_per_replication(), 1500);
        assert!((config.rho() - 0.75).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn customer_count_is_floored() {
        let config = SimConfig::new(2.5, 4.0, 3.3, 10);
        assert_eq!(config.customers_per_replication(), 8);
    }

    #[test]
    fn rejects_unstable_queue() {
        let err = SimConfig::new(4.0, 4.0, 500.0, 30).validate().unwrap_err();
        assert_eq!(err, SimError::Unstable { lambda: 4.0, mu: 4.0 });

        let err = SimConfig::new(5.0, 4.0, 500.0, 30).validate().unwrap_err();
        assert!(matches!(err, SimError::Unstable { .. }));
    }

    #[test]
    fn rejects_single_replication() {
        let err = SimConfig::default().with_replications(1).validate().unwrap_err();
        assert_eq!(err, SimError::InsufficientReplications(1));
    }

    #[test]
    fn rejects_bad_rates_and_horizon() {
        assert!(matches!(
            SimConfig::new(0.0, 4.0, 500.0, 30).validate(),
            Err(SimError::NonPositiveRate { name: "lambda", .. })
        ));
        assert!(matches!(
            SimConfig::new(3.0, -1.0, 500.0, 30).validate(),
            Err(SimError::NonPositiveRate { name: "mu", .. })
        ));
        assert!(matches!(
            SimConfig::new(3.0, 4.0, 0.0, 30).validate(),
            Err(SimError::NonPositiveHorizon(_))
        ));
        assert!(matches!(
            SimConfig::new(3.0, 4.0, f64::NAN, 30).validate(),
            Err(SimError::NonPositiveHorizon(_))
        ));
    }

    #[test]
    fn rejects_horizon_too_short_for_one_customer() {
        let err = SimConfig::new(3.0, 4.0, 0.2, 30).validate().unwrap_err();
        assert!(matches!(err, SimError::NoCustomers { .. }));
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        for c in [0.0, 1.0, 1.5, -0.1] {
            let err = SimConfig::default().with_confidence(c).validate().unwrap_err();
            assert_eq!(err, SimError::InvalidConfidence(c));
        }
    }
}
