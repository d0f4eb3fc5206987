//! Migration test output stream
//!
//! Human- and script-readable text written in a fixed order. Field order,
//! number formats and the status strings are parsed downstream and must
//! not change.

use crate::models::{
    IterationRecord, MigrationSummary, NodeHistogram, NodeId, PlacementOutcome, PlacementReport,
};
use anyhow::{Context, Result};
use std::io::Write;

/// Column header preceding the per-iteration rows
pub const CSV_HEADER: &str = "Iteration, IterTime(s), Node0%, Node1%, Status";

/// Writes the migration test stream to a sink
pub struct MigrationReport<W: Write> {
    out: W,
}

impl<W: Write> MigrationReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> Result<()> {
        self.out
            .write_fmt(text)
            .and_then(|_| self.out.write_all(b"\n"))
            .context("Failed to write migration output")
    }

    pub fn banner(&mut self, cpu: usize, local: NodeId) -> Result<()> {
        self.line(format_args!("=== Page Migration Test ==="))?;
        self.line(format_args!("Running on CPU {} (Node {})", cpu, local))
    }

    pub fn forcing(&mut self, target: NodeId) -> Result<()> {
        self.line(format_args!(
            "Will force pages to Node {} (remote) first\n",
            target
        ))?;
        self.line(format_args!(
            "Forcing pages to Node {} (creating mismatch for migration test)...",
            target
        ))
    }

    pub fn placement(&mut self, report: &PlacementReport) -> Result<()> {
        match report.outcome {
            PlacementOutcome::Completed => self.line(format_args!(
                "✓ Successfully moved {}/{} pages to Node {}",
                report.moved, report.requested, report.target
            )),
            PlacementOutcome::ScratchAllocation => {
                self.line(format_args!("  WARNING: Cannot allocate arrays for migration"))
            }
            PlacementOutcome::Kernel(ret) => self.line(format_args!(
                "  WARNING: move_pages returned {} (some pages may not have moved)",
                ret
            )),
        }
    }

    pub fn sampling(&mut self, samples: usize) -> Result<()> {
        self.line(format_args!(
            "Sampling {} pages (0.1% of array) for distribution check",
            samples
        ))
    }

    pub fn initial_distribution(&mut self, histogram: &NodeHistogram) -> Result<()> {
        self.distribution("Initial", histogram)
    }

    pub fn final_distribution(&mut self, histogram: &NodeHistogram) -> Result<()> {
        self.distribution("Final", histogram)
    }

    fn distribution(&mut self, label: &str, histogram: &NodeHistogram) -> Result<()> {
        self.line(format_args!(
            "{} distribution: Node0={}%, Node1={}%",
            label,
            histogram.percent(0),
            histogram.percent(1)
        ))
    }

    /// Announce the pressure phase and print the column header
    pub fn begin_iterations(&mut self) -> Result<()> {
        self.line(format_args!(
            "\n--- Starting intensive access to trigger Auto-NUMA ---"
        ))?;
        self.line(format_args!("{}", CSV_HEADER))
    }

    pub fn iteration(&mut self, record: &IterationRecord) -> Result<()> {
        self.line(format_args!(
            "{}, {:.3}, {}, {}, {}",
            record.iteration,
            record.access_secs,
            record.node0_percent,
            record.node1_percent,
            record.status
        ))?;
        self.out.flush().context("Failed to flush migration output")
    }

    pub fn summary(&mut self, summary: &MigrationSummary) -> Result<()> {
        self.final_distribution(&summary.final_distribution)?;
        self.line(format_args!(
            "Migration occurred: {}",
            if summary.migration_occurred { "YES" } else { "NO" }
        ))?;
        self.line(format_args!("\n=== Performance Summary ==="))?;
        self.line(format_args!(
            "Pure access time: {:.3} seconds",
            summary.pure_access_secs
        ))?;
        self.line(format_args!(
            "Total wall time (includes pauses): {:.3} seconds",
            summary.total_wall_secs
        ))?;
        self.line(format_args!(
            "Overhead (sampling + sleeping): {:.3} seconds",
            summary.overhead_secs()
        ))?;
        self.line(format_args!(
            "Sum (prevent optimization): {}",
            summary.checksum
        ))?;
        self.out.flush().context("Failed to flush migration output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MigrationStatus, PageLocation};

    fn render(write: impl FnOnce(&mut MigrationReport<&mut Vec<u8>>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut MigrationReport::new(&mut buf)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_iteration_row_format() {
        let text = render(|report| {
            report.iteration(&IterationRecord {
                iteration: 7,
                access_secs: 0.01234,
                wall_secs: 0.08,
                node0_percent: 42,
                node1_percent: 57,
                status: MigrationStatus::Migrating,
            })
        });

        assert_eq!(text, "7, 0.012, 42, 57, Migrating\n");
    }

    #[test]
    fn test_placement_lines() {
        let text = render(|report| {
            report.placement(&PlacementReport::completed(NodeId(1), 10, 9))?;
            report.placement(&PlacementReport::failed(
                NodeId(1),
                10,
                PlacementOutcome::ScratchAllocation,
            ))?;
            report.placement(&PlacementReport::failed(
                NodeId(1),
                10,
                PlacementOutcome::Kernel(-1),
            ))?;
            report.placement(&PlacementReport::failed(
                NodeId(1),
                10,
                PlacementOutcome::Kernel(3),
            ))
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "✓ Successfully moved 9/10 pages to Node 1");
        assert_eq!(lines[1], "  WARNING: Cannot allocate arrays for migration");
        assert_eq!(
            lines[2],
            "  WARNING: move_pages returned -1 (some pages may not have moved)"
        );
        assert_eq!(
            lines[3],
            "  WARNING: move_pages returned 3 (some pages may not have moved)"
        );
    }

    #[test]
    fn test_distribution_and_header() {
        let mut hist = NodeHistogram::new(4);
        hist.record(PageLocation::Node(NodeId(0)));
        hist.record(PageLocation::Node(NodeId(1)));
        hist.record(PageLocation::Node(NodeId(1)));
        hist.record(PageLocation::Node(NodeId(1)));

        let text = render(|report| {
            report.initial_distribution(&hist)?;
            report.begin_iterations()
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Initial distribution: Node0=25%, Node1=75%");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "--- Starting intensive access to trigger Auto-NUMA ---");
        assert_eq!(lines[3], CSV_HEADER);
    }
}
