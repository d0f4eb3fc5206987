//! Structured logging for probe events
//!
//! Every event carries an `event` discriminator and the name of the test
//! that produced it, so JSON logs from many runs can be filtered without
//! parsing message text. Logs never go to the output stream itself.

use crate::models::{AccessReport, MigrationSummary, PlacementReport, ThreadReport};
use tracing::info;

/// Structured logger for harness events
#[derive(Clone)]
pub struct ProbeLogger {
    test: String,
}

impl ProbeLogger {
    pub fn new(test: impl Into<String>) -> Self {
        Self { test: test.into() }
    }

    /// Log harness startup
    pub fn log_startup(&self, version: &str, size_mb: usize, elements: usize, nodes: usize) {
        info!(
            event = "probe_started",
            test = %self.test,
            version = %version,
            size_mb,
            elements,
            nodes,
            "NUMA probe started"
        );
    }

    /// Log a completed forced placement
    ///
    /// Failed requests are reported where they fail, with the error.
    pub fn log_placement(&self, report: &PlacementReport) {
        if !report.succeeded() {
            return;
        }
        info!(
            event = "placement_forced",
            test = %self.test,
            target = report.target.0,
            moved = report.moved,
            requested = report.requested,
            "Forced pages onto target node"
        );
    }

    /// Log the end of a migration test
    pub fn log_migration_summary(&self, summary: &MigrationSummary) {
        info!(
            event = "migration_summary",
            test = %self.test,
            started_at = %summary.started_at.to_rfc3339(),
            cpu = summary.cpu,
            local_node = summary.local_node.0,
            remote_node = summary.remote_node.0,
            samples = summary.sample_count,
            iterations = summary.iterations,
            initial_node0_percent = summary.initial.percent(0),
            final_node0_percent = summary.final_distribution.percent(0),
            migration_occurred = summary.migration_occurred,
            pure_access_secs = summary.pure_access_secs,
            total_wall_secs = summary.total_wall_secs,
            overhead_secs = summary.overhead_secs(),
            "Migration test complete"
        );
    }

    /// Log an access-pattern benchmark result
    pub fn log_access_report(&self, report: &AccessReport) {
        info!(
            event = "benchmark_complete",
            test = %self.test,
            pattern = %report.pattern,
            accesses = report.accesses,
            time_secs = report.time_secs,
            throughput_mbps = report.throughput_mbps,
            avg_latency_ns = report.avg_latency_ns,
            "Access benchmark complete"
        );
    }

    /// Log the partitioned sum benchmark result
    pub fn log_threads(&self, threads: &[ThreadReport], total_secs: f64) {
        let slowest = threads.iter().map(|t| t.time_secs).fold(0.0, f64::max);
        info!(
            event = "benchmark_complete",
            test = %self.test,
            threads = threads.len(),
            slowest_thread_secs = slowest,
            total_secs,
            "Parallel sum complete"
        );
    }

    /// Log harness shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "probe_shutdown",
            test = %self.test,
            reason = %reason,
            "NUMA probe shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_logger_creation() {
        let logger = ProbeLogger::new("migrate");
        assert_eq!(logger.test, "migrate");
    }

    #[test]
    fn test_log_threads_without_subscriber() {
        let logger = ProbeLogger::new("threads");
        logger.log_threads(
            &[ThreadReport {
                thread_id: 0,
                sum: 10,
                time_secs: 0.5,
            }],
            0.6,
        );
        logger.log_threads(&[], 0.0);
    }
}
