//! One replication of a single-server FIFO queue.
//!
//! Timings come straight from the recurrence
//! `start[i] = max(arrival[i], end[i-1])`, `end[i] = start[i] + service[i]`,
//! which is exact for one FIFO server. It does not extend to several servers;
//! that would need a proper event-queue simulation.

use crate::error::{check_rate, Result, SimError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

const ARRIVAL_STREAM: u64 = 1;
const SERVICE_STREAM: u64 = 2;

/// Timing of one customer through the server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub index: usize,
    pub arrival: f64,
    pub service: f64,
    pub service_start: f64,
    pub service_end: f64,
}

impl Customer {
    pub fn wait(&self) -> f64 {
        self.service_start - self.arrival
    }

    pub fn system_time(&self) -> f64 {
        self.wait() + self.service
    }
}

/// Per-replication means. Queue lengths are Little's-law estimates
/// (time metric times lambda).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationResult {
    pub customers: usize,
    pub mean_wait: f64,
    pub mean_system_time: f64,
    pub mean_queue_length: f64,
    pub mean_number_in_system: f64,
    /// Busy time over the expected horizon `n / lambda`, not over the last
    /// departure. A single replication can land slightly above 1.
    pub utilization: f64,
}

/// The two independent draw streams one replication consumes.
#[derive(Debug, Clone)]
pub struct Streams<R = StdRng> {
    pub arrivals: R,
    pub service: R,
}

impl Streams<StdRng> {
    /// Streams for replication `index` under `master`. Distinct indices give
    /// distinct, reproducible streams regardless of which thread runs them.
    pub fn for_replication(master: u64, index: u64) -> Self {
        Self {
            arrivals: StdRng::seed_from_u64(stream_seed(master, index, ARRIVAL_STREAM)),
            service: StdRng::seed_from_u64(stream_seed(master, index, SERVICE_STREAM)),
        }
    }
}

fn stream_seed(master: u64, index: u64, stream: u64) -> u64 {
    let mut z = master
        ^ index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ stream.wrapping_mul(0xd1b5_4a32_d192_ed03);
    // splitmix64 finalizer
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Single FIFO server state: the arrival clock and the last departure.
#[derive(Debug, Default)]
struct FifoServer {
    clock: f64,
    last_end: Option<f64>,
    admitted: usize,
}

impl FifoServer {
    fn admit(&mut self, gap: f64, service: f64) -> Customer {
        self.clock += gap;
        let arrival = self.clock;
        let service_start = match self.last_end {
            Some(end) => arrival.max(end),
            None => arrival,
        };
        let service_end = service_start + service;
        self.last_end = Some(service_end);

        let customer = Customer {
            index: self.admitted,
            arrival,
            service,
            service_start,
            service_end,
        };
        self.admitted += 1;
        customer
    }
}

/// Runs the FIFO recurrence over supplied draws. Customer 0 arrives at its own
/// first gap; there is no separate time-zero arrival.
pub fn customers_from_draws(gaps: &[f64], services: &[f64]) -> Result<Vec<Customer>> {
    if gaps.len() != services.len() {
        return Err(SimError::MismatchedDraws {
            gaps: gaps.len(),
            services: services.len(),
        });
    }

    let mut server = FifoServer::default();
    Ok(gaps
        .iter()
        .zip(services)
        .map(|(&gap, &service)| server.admit(gap, service))
        .collect())
}

/// Draws one replication and returns its full customer table.
pub fn simulate_customers<R: Rng>(
    lambda: f64,
    mu: f64,
    n: usize,
    streams: &mut Streams<R>,
) -> Result<Vec<Customer>> {
    let (interarrival, service) = distributions(lambda, mu, n)?;
    let gaps: Vec<f64> = interarrival.sample_iter(&mut streams.arrivals).take(n).collect();
    let services: Vec<f64> = service.sample_iter(&mut streams.service).take(n).collect();
    customers_from_draws(&gaps, &services)
}

/// One replication of `n` customers. Accumulates in a single pass without
/// keeping the customer table.
pub fn run_replication<R: Rng>(
    lambda: f64,
    mu: f64,
    n: usize,
    streams: &mut Streams<R>,
) -> Result<ReplicationResult> {
    let (interarrival, service) = distributions(lambda, mu, n)?;

    let mut server = FifoServer::default();
    let mut total_wait = 0.0;
    let mut total_service = 0.0;
    for _ in 0..n {
        let gap = interarrival.sample(&mut streams.arrivals);
        let duration = service.sample(&mut streams.service);
        let customer = server.admit(gap, duration);
        total_wait += customer.wait();
        total_service += duration;
    }

    Ok(summarize(lambda, n, total_wait, total_service))
}

/// Replication means from a customer table.
pub fn summarize_customers(lambda: f64, customers: &[Customer]) -> Result<ReplicationResult> {
    check_rate("lambda", lambda)?;
    if customers.is_empty() {
        return Err(SimError::EmptyReplication);
    }
    let total_wait: f64 = customers.iter().map(Customer::wait).sum();
    let total_service: f64 = customers.iter().map(|c| c.service).sum();
    Ok(summarize(lambda, customers.len(), total_wait, total_service))
}

fn summarize(lambda: f64, n: usize, total_wait: f64, total_service: f64) -> ReplicationResult {
    let count = n as f64;
    let mean_wait = total_wait / count;
    let mean_system_time = (total_wait + total_service) / count;

    ReplicationResult {
        customers: n,
        mean_wait,
        mean_system_time,
        mean_queue_length: mean_wait * lambda,
        mean_number_in_system: mean_system_time * lambda,
        utilization: total_service / (count / lambda),
    }
}

fn distributions(lambda: f64, mu: f64, n: usize) -> Result<(Exp<f64>, Exp<f64>)> {
    check_rate("lambda", lambda)?;
    check_rate("mu", mu)?;
    if n < 1 {
        return Err(SimError::EmptyReplication);
    }
    let interarrival =
        Exp::new(lambda).map_err(|_| SimError::NonPositiveRate { name: "lambda", value: lambda })?;
    let service = Exp::new(mu).map_err(|_| SimError::NonPositiveRate { name: "mu", value: mu })?;
    Ok((interarrival, service))
}
