use crate::replication::ReplicationResult;
use anyhow::Result;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct Row {
    replication: usize,
    customers: usize,
    mean_wait: f64,
    mean_system_time: f64,
    mean_queue_length: f64,
    mean_number_in_system: f64,
    utilization: f64,
}

impl Row {
    fn new(replication: usize, result: &ReplicationResult) -> Self {
        Self {
            replication,
            customers: result.customers,
            mean_wait: result.mean_wait,
            mean_system_time: result.mean_system_time,
            mean_queue_length: result.mean_queue_length,
            mean_number_in_system: result.mean_number_in_system,
            utilization: result.utilization,
        }
    }
}

/// Writes per-replication results as CSV, one row per replication.
pub struct ReplicationLogger {
    writer: Writer<File>,
}

impl ReplicationLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log(&mut self, replication: usize, result: &ReplicationResult) -> Result<()> {
        self.writer.serialize(Row::new(replication, result))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_batch(&mut self, results: &[ReplicationResult]) -> Result<()> {
        for (replication, result) in results.iter().enumerate() {
            self.writer.serialize(Row::new(replication, result))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_replication() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");

        let result = ReplicationResult {
            customers: 3,
            mean_wait: 0.5,
            mean_system_time: 0.75,
            mean_queue_length: 1.5,
            mean_number_in_system: 2.25,
            utilization: 0.7,
        };
        let mut logger = ReplicationLogger::new(&path).unwrap();
        logger.log_batch(&[result, result]).unwrap();
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "replication,customers,mean_wait,mean_system_time,mean_queue_length,mean_number_in_system,utilization"
        );
        assert!(lines[2].starts_with("1,3,0.5,"));
    }
}
