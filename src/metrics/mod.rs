pub mod analyzer;
pub mod interval;
pub mod logger;

pub use interval::{normal_interval, ConfidenceInterval};

use crate::error::{Result, SimError};
use crate::replication::ReplicationResult;
use crate::theory::Theoretical;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Reported metrics, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    WaitInQueue,
    TimeInSystem,
    QueueLength,
    NumberInSystem,
    Utilization,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::WaitInQueue,
        Metric::TimeInSystem,
        Metric::QueueLength,
        Metric::NumberInSystem,
        Metric::Utilization,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::WaitInQueue => "Average time in queue",
            Metric::TimeInSystem => "Average time in system",
            Metric::QueueLength => "Average queue length",
            Metric::NumberInSystem => "Average number in system",
            Metric::Utilization => "Server utilization",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::WaitInQueue | Metric::TimeInSystem => "time",
            Metric::QueueLength | Metric::NumberInSystem => "customers",
            Metric::Utilization => "",
        }
    }

    pub fn of(&self, result: &ReplicationResult) -> f64 {
        match self {
            Metric::WaitInQueue => result.mean_wait,
            Metric::TimeInSystem => result.mean_system_time,
            Metric::QueueLength => result.mean_queue_length,
            Metric::NumberInSystem => result.mean_number_in_system,
            Metric::Utilization => result.utilization,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEstimate {
    pub metric: Metric,
    pub mean: f64,
    pub interval: ConfidenceInterval,
    pub relative_error: f64,
    pub theoretical: f64,
    pub std_err: f64,
}

impl MetricEstimate {
    /// `(mean, lower, upper, relative error)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.mean, self.interval.lower, self.interval.upper, self.relative_error)
    }
}

/// Sample mean, normal interval on `s / sqrt(N)` and relative error against
/// `theoretical`. Needs at least two samples.
pub fn estimate(
    metric: Metric,
    samples: &[f64],
    theoretical: f64,
    confidence: f64,
) -> Result<MetricEstimate> {
    if samples.len() < 2 {
        return Err(SimError::InsufficientReplications(samples.len()));
    }

    let mean = samples.iter().mean();
    let std_dev = samples.iter().std_dev();
    let std_err = std_dev / (samples.len() as f64).sqrt();

    Ok(MetricEstimate {
        metric,
        mean,
        interval: normal_interval(confidence, mean, std_err)?,
        relative_error: (mean - theoretical).abs() / theoretical,
        theoretical,
        std_err,
    })
}

/// Output of one aggregated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    pub lambda: f64,
    pub mu: f64,
    pub horizon: f64,
    pub replications: usize,
    pub customers_per_replication: usize,
    pub seed: u64,
    pub confidence: f64,
    pub estimates: Vec<MetricEstimate>,
}

impl Report {
    pub fn get(&self, metric: Metric) -> Option<&MetricEstimate> {
        self.estimates.iter().find(|e| e.metric == metric)
    }

    /// Per metric `(mean, lower, upper, relative error)` in [`Metric::ALL`] order.
    pub fn tuples(&self) -> Vec<(f64, f64, f64, f64)> {
        self.estimates.iter().map(MetricEstimate::as_tuple).collect()
    }
}

/// Reduces replication results into one estimate per metric.
pub fn reduce(
    results: &[ReplicationResult],
    theory: &Theoretical,
    confidence: f64,
) -> Result<Vec<MetricEstimate>> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let samples: Vec<f64> = results.iter().map(|r| metric.of(r)).collect();
            estimate(metric, &samples, theory.value(metric), confidence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(wait: f64, utilization: f64) -> ReplicationResult {
        ReplicationResult {
            customers: 10,
            mean_wait: wait,
            mean_system_time: wait + 0.25,
            mean_queue_length: wait * 3.0,
            mean_number_in_system: (wait + 0.25) * 3.0,
            utilization,
        }
    }

    #[test]
    fn estimate_uses_sample_standard_error() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let e = estimate(Metric::WaitInQueue, &samples, 2.0, 0.95).unwrap();

        assert!((e.mean - 2.5).abs() < 1e-12);
        // sample sd = sqrt(5/3), se = sd / 2
        let se = (5.0f64 / 3.0).sqrt() / 2.0;
        assert!((e.std_err - se).abs() < 1e-12);
        assert!((e.relative_error - 0.25).abs() < 1e-12);
        assert!((e.interval.half_width() - 1.959_963_984_540_054 * se).abs() < 1e-6);
    }

    #[test]
    fn identical_samples_give_point_interval() {
        let e = estimate(Metric::Utilization, &[0.75; 8], 0.75, 0.95).unwrap();
        assert_eq!(e.std_err, 0.0);
        assert_eq!(e.interval.lower, 0.75);
        assert_eq!(e.interval.upper, 0.75);
        assert_eq!(e.relative_error, 0.0);
    }

    #[test]
    fn single_sample_is_rejected() {
        let err = estimate(Metric::Utilization, &[0.7], 0.75, 0.95).unwrap_err();
        assert_eq!(err, SimError::InsufficientReplications(1));
    }

    #[test]
    fn reduce_keeps_metric_order() {
        let theory = Theoretical::mm1(3.0, 4.0).unwrap();
        let results = [result(0.7, 0.74), result(0.8, 0.76), result(0.75, 0.75)];
        let estimates = reduce(&results, &theory, 0.95).unwrap();

        let order: Vec<Metric> = estimates.iter().map(|e| e.metric).collect();
        assert_eq!(order, Metric::ALL.to_vec());
        assert!((estimates[4].mean - 0.75).abs() < 1e-12);
        assert_eq!(estimates[4].theoretical, 0.75);
    }
}
