pub mod config;
pub use config::SimConfig;

use crate::error::Result;
use crate::metrics::{self, Report};
use crate::replication::{run_replication, ReplicationResult, Streams};
use crate::theory::Theoretical;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs every replication of a configuration and reduces the results.
pub struct Simulation {
    config: SimConfig,
    progress: bool,
    results: Vec<ReplicationResult>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            progress: false,
            results: Vec::new(),
        }
    }

    /// Shows a progress bar over replications.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Replication results of the last run, in replication order.
    pub fn results(&self) -> &[ReplicationResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<Report> {
        self.config.validate()?;
        let theory = Theoretical::mm1(self.config.lambda, self.config.mu)?;

        let seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().r#gen::<u64>());
        let lambda = self.config.lambda;
        let mu = self.config.mu;
        let n = self.config.customers_per_replication();
        let replications = self.config.replications;

        info!(
            "Starting {}: lambda={}, mu={}, horizon={}, replications={}, customers={}, seed={}",
            self.config.name, lambda, mu, self.config.horizon, replications, n, seed
        );
        let started = Instant::now();

        let pb = if self.progress {
            let pb = ProgressBar::new(replications as u64);
            let style = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} replications")
                .map(|s| s.progress_chars("█▓░"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        } else {
            ProgressBar::hidden()
        };

        // Each replication owns streams derived from (seed, index), so the
        // collected order and values do not depend on the thread pool.
        let results = (0..replications)
            .into_par_iter()
            .progress_with(pb.clone())
            .map(|index| -> Result<ReplicationResult> {
                let mut streams = Streams::for_replication(seed, index as u64);
                let result = run_replication(lambda, mu, n, &mut streams)?;
                debug!(
                    "Replication {}: wait={:.4}, utilization={:.4}",
                    index, result.mean_wait, result.utilization
                );
                if result.utilization > 1.0 {
                    warn!(
                        "Replication {} utilization {:.4} exceeds 1 (finite-horizon edge effect)",
                        index, result.utilization
                    );
                }
                Ok(result)
            })
            .collect::<Result<Vec<_>>>()?;
        pb.finish_and_clear();

        let estimates = metrics::reduce(&results, &theory, self.config.confidence)?;
        self.results = results;

        info!(
            "Finished {} in {:.2}s",
            self.config.name,
            started.elapsed().as_secs_f64()
        );

        Ok(Report {
            name: self.config.name.clone(),
            lambda,
            mu,
            horizon: self.config.horizon,
            replications,
            customers_per_replication: n,
            seed,
            confidence: self.config.confidence,
            estimates,
        })
    }
}

/// Aggregates `replications` runs of `floor(horizon * lambda)` customers with
/// a fresh seed.
pub fn aggregate(lambda: f64, mu: f64, horizon: f64, replications: usize) -> Result<Report> {
    Simulation::new(SimConfig::new(lambda, mu, horizon, replications)).run()
}

/// Like [`aggregate`], reproducible for a fixed `seed`.
pub fn aggregate_seeded(
    lambda: f64,
    mu: f64,
    horizon: f64,
    replications: usize,
    seed: u64,
) -> Result<Report> {
    Simulation::new(SimConfig::new(lambda, mu, horizon, replications).with_seed(seed)).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::metrics::Metric;

    #[test]
    fn report_carries_configuration() {
        let report = aggregate_seeded(3.0, 4.0, 50.0, 10, 5).unwrap();
        assert_eq!(report.customers_per_replication, 150);
        assert_eq!(report.replications, 10);
        assert_eq!(report.seed, 5);
        assert_eq!(report.estimates.len(), 5);
        assert_eq!(report.get(Metric::WaitInQueue).unwrap().theoretical, 1.0);
    }

    #[test]
    fn results_are_kept_in_replication_order() {
        let config = SimConfig::new(3.0, 4.0, 20.0, 6).with_seed(11);
        let mut sim = Simulation::new(config);
        sim.run().unwrap();

        assert_eq!(sim.results().len(), 6);
        let mut streams = Streams::for_replication(11, 3);
        let direct = run_replication(3.0, 4.0, 60, &mut streams).unwrap();
        assert_eq!(sim.results()[3], direct);
    }

    #[test]
    fn no_partial_report_on_bad_config() {
        let mut sim = Simulation::new(SimConfig::new(4.0, 3.0, 500.0, 30));
        assert!(matches!(sim.run(), Err(SimError::Unstable { .. })));
        assert!(sim.results().is_empty());

        assert_eq!(
            aggregate(3.0, 4.0, 500.0, 1).unwrap_err(),
            SimError::InsufficientReplications(1)
        );
    }

    #[test]
    fn unseeded_runs_record_their_seed() {
        let first = aggregate(3.0, 4.0, 10.0, 4).unwrap();
        let replay = aggregate_seeded(3.0, 4.0, 10.0, 4, first.seed).unwrap();
        assert_eq!(first.estimates, replay.estimates);
    }
}
