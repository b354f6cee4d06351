pub mod error;
pub mod metrics;
pub mod replication;
pub mod simulation;
pub mod theory;

pub use error::SimError;
pub use metrics::{Metric, MetricEstimate, Report};
pub use replication::{run_replication, ReplicationResult};
pub use simulation::{aggregate, aggregate_seeded, SimConfig, Simulation};
pub use theory::Theoretical;

pub mod prelude {
    pub use crate::error::SimError;
    pub use crate::metrics::{ConfidenceInterval, Metric, MetricEstimate, Report};
    pub use crate::replication::{Customer, ReplicationResult, Streams};
    pub use crate::simulation::{aggregate, aggregate_seeded, SimConfig, Simulation};
    pub use crate::theory::Theoretical;
}
