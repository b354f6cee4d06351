//! Closed-form steady-state M/M/1 values.

use crate::error::{check_rate, Result, SimError};
use crate::metrics::Metric;
use serde::{Deserialize, Serialize};

/// Reference values the estimates are validated against.
///
/// `wait_in_queue` is taken as `1/(mu-lambda)`, which is the classic M/M/1
/// sojourn time, and `time_in_system` adds one mean service on top. The
/// simulated waits therefore sit below these two references, and the queue
/// length estimate (`lambda * wait`) sits above `lambda/(mu(mu-lambda))`.
/// Utilization and number in system are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theoretical {
    pub wait_in_queue: f64,
    pub time_in_system: f64,
    pub queue_length: f64,
    pub number_in_system: f64,
    pub utilization: f64,
}

impl Theoretical {
    /// Requires `0 < lambda < mu`; the formulas diverge or go negative otherwise.
    pub fn mm1(lambda: f64, mu: f64) -> Result<Self> {
        check_rate("lambda", lambda)?;
        check_rate("mu", mu)?;
        if mu <= lambda {
            return Err(SimError::Unstable { lambda, mu });
        }

        let slack = mu - lambda;
        Ok(Self {
            wait_in_queue: 1.0 / slack,
            time_in_system: 1.0 / slack + 1.0 / mu,
            queue_length: lambda / (mu * slack),
            number_in_system: lambda / slack,
            utilization: lambda / mu,
        })
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WaitInQueue => self.wait_in_queue,
            Metric::TimeInSystem => self.time_in_system,
            Metric::QueueLength => self.queue_length,
            Metric::NumberInSystem => self.number_in_system,
            Metric::Utilization => self.utilization,
        }
    }
}
