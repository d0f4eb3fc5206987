//! Core data models for the NUMA probe

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of nodes tracked by a distribution histogram
pub const TRACKED_NODES: usize = 2;

/// NUMA node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node a page should be forced onto to be remote from `self`
    ///
    /// Only the first two nodes are considered: node 0 maps to node 1 and
    /// every other node maps to node 0.
    pub fn remote_peer(self) -> NodeId {
        if self.0 == 0 {
            NodeId(1)
        } else {
            NodeId(0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical location of a page as reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLocation {
    Node(NodeId),
    /// The lookup failed; never to be counted as any node
    Unknown,
}

/// Per-node page counts from one sampling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeHistogram {
    /// Samples found on node 0 and node 1
    pub counts: [usize; TRACKED_NODES],
    /// Samples whose location was unknown or outside the tracked nodes
    pub excluded: usize,
    /// Total samples drawn
    pub samples: usize,
}

impl NodeHistogram {
    /// Create an empty histogram for `samples` draws
    pub fn new(samples: usize) -> Self {
        Self {
            counts: [0; TRACKED_NODES],
            excluded: 0,
            samples,
        }
    }

    /// Tally one located sample
    pub fn record(&mut self, location: PageLocation) {
        match location {
            PageLocation::Node(NodeId(n)) if (n as usize) < TRACKED_NODES => {
                self.counts[n as usize] += 1;
            }
            _ => self.excluded += 1,
        }
    }

    /// Share of samples on `node`, truncated toward zero
    pub fn percent(&self, node: usize) -> u32 {
        if self.samples == 0 || node >= TRACKED_NODES {
            return 0;
        }
        (self.counts[node] * 100 / self.samples) as u32
    }

    /// True when any node bucket differs from `other`
    pub fn differs_from(&self, other: &NodeHistogram) -> bool {
        self.counts != other.counts
    }
}

/// Placement state derived from the node-0 share of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    #[serde(rename = "All_Remote")]
    AllRemote,
    #[serde(rename = "All_Local")]
    AllLocal,
    #[serde(rename = "Migrating")]
    Migrating,
}

impl MigrationStatus {
    /// Classify from the node-0 percentage alone
    pub fn classify(node0_percent: u32) -> Self {
        match node0_percent {
            0 => MigrationStatus::AllRemote,
            100 => MigrationStatus::AllLocal,
            _ => MigrationStatus::Migrating,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::AllRemote => "All_Remote",
            MigrationStatus::AllLocal => "All_Local",
            MigrationStatus::Migrating => "Migrating",
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pressure/sample cycle of the migration test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Time spent in the access loop only
    pub access_secs: f64,
    /// Time of the whole cycle: burst, settle delay and sampling
    pub wall_secs: f64,
    pub node0_percent: u32,
    pub node1_percent: u32,
    pub status: MigrationStatus,
}

impl IterationRecord {
    pub fn from_histogram(
        iteration: usize,
        access_secs: f64,
        wall_secs: f64,
        histogram: &NodeHistogram,
    ) -> Self {
        let node0_percent = histogram.percent(0);
        Self {
            iteration,
            access_secs,
            wall_secs,
            node0_percent,
            node1_percent: histogram.percent(1),
            status: MigrationStatus::classify(node0_percent),
        }
    }
}

/// How a forced placement request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ret", rename_all = "snake_case")]
pub enum PlacementOutcome {
    /// The kernel processed the batch; per-page results are in `moved`
    Completed,
    /// The address, node or status arrays could not be allocated
    ScratchAllocation,
    /// `move_pages` returned nonzero: `-1` on failure, otherwise the
    /// number of pages it left behind
    Kernel(i64),
}

/// Outcome of a forced placement request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementReport {
    pub target: NodeId,
    /// Pages the region spans
    pub requested: usize,
    /// Pages reported on the target node after the request
    pub moved: usize,
    pub outcome: PlacementOutcome,
}

impl PlacementReport {
    pub fn completed(target: NodeId, requested: usize, moved: usize) -> Self {
        Self {
            target,
            requested,
            moved,
            outcome: PlacementOutcome::Completed,
        }
    }

    /// A request that moved nothing the harness can account for
    pub fn failed(target: NodeId, requested: usize, outcome: PlacementOutcome) -> Self {
        Self {
            target,
            requested,
            moved: 0,
            outcome,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == PlacementOutcome::Completed
    }
}

/// Result of a complete migration test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub started_at: DateTime<Utc>,
    pub cpu: usize,
    pub local_node: NodeId,
    pub remote_node: NodeId,
    /// Absent when the region was left where it was
    pub placement: Option<PlacementReport>,
    pub sample_count: usize,
    pub initial: NodeHistogram,
    pub final_distribution: NodeHistogram,
    pub iterations: usize,
    pub migration_occurred: bool,
    /// Sum of the access-loop times of every iteration
    pub pure_access_secs: f64,
    /// Wall time of the whole iteration phase
    pub total_wall_secs: f64,
    /// Accumulated value of every read, reported so the loop cannot be elided
    pub checksum: i64,
}

impl MigrationSummary {
    /// Time spent outside the access loops (settling and sampling)
    pub fn overhead_secs(&self) -> f64 {
        self.total_wall_secs - self.pure_access_secs
    }
}

/// Throughput and latency of one access-pattern benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessReport {
    pub pattern: String,
    pub accesses: usize,
    pub time_secs: f64,
    pub throughput_mbps: f64,
    pub avg_latency_ns: f64,
    pub checksum: i64,
}

impl AccessReport {
    /// Derive throughput and latency for `accesses` word reads taking `time_secs`
    pub fn new(pattern: impl Into<String>, accesses: usize, time_secs: f64, checksum: i64) -> Self {
        let bytes = (accesses * std::mem::size_of::<i64>()) as f64;
        let (throughput_mbps, avg_latency_ns) = if time_secs > 0.0 && accesses > 0 {
            (
                (bytes / (1024.0 * 1024.0)) / time_secs,
                (time_secs * 1_000_000_000.0) / accesses as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            pattern: pattern.into(),
            accesses,
            time_secs,
            throughput_mbps,
            avg_latency_ns,
            checksum,
        }
    }
}

/// Per-thread result of the partitioned sum benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadReport {
    pub thread_id: usize,
    pub sum: i64,
    pub time_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(MigrationStatus::classify(0), MigrationStatus::AllRemote);
        assert_eq!(MigrationStatus::classify(100), MigrationStatus::AllLocal);
        for pct in 1..100 {
            assert_eq!(MigrationStatus::classify(pct), MigrationStatus::Migrating);
        }
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(MigrationStatus::AllRemote.to_string(), "All_Remote");
        assert_eq!(MigrationStatus::AllLocal.to_string(), "All_Local");
        assert_eq!(MigrationStatus::Migrating.to_string(), "Migrating");
        assert_eq!(
            serde_json::to_string(&MigrationStatus::AllLocal).unwrap(),
            "\"All_Local\""
        );
    }

    #[test]
    fn test_percent_truncates() {
        let mut hist = NodeHistogram::new(3);
        hist.record(PageLocation::Node(NodeId(0)));
        hist.record(PageLocation::Node(NodeId(0)));
        hist.record(PageLocation::Node(NodeId(1)));

        // 200/3 = 66.67 and 100/3 = 33.33, both truncated
        assert_eq!(hist.percent(0), 66);
        assert_eq!(hist.percent(1), 33);
    }

    #[test]
    fn test_percent_never_rounds_up_to_full() {
        let mut hist = NodeHistogram::new(1000);
        for _ in 0..999 {
            hist.record(PageLocation::Node(NodeId(0)));
        }
        hist.record(PageLocation::Unknown);

        assert_eq!(hist.percent(0), 99);
        assert_eq!(MigrationStatus::classify(hist.percent(0)), MigrationStatus::Migrating);
    }

    #[test]
    fn test_record_excludes_unknown_and_untracked_nodes() {
        let mut hist = NodeHistogram::new(4);
        hist.record(PageLocation::Unknown);
        hist.record(PageLocation::Node(NodeId(2)));
        hist.record(PageLocation::Node(NodeId(1)));
        hist.record(PageLocation::Node(NodeId(0)));

        assert_eq!(hist.counts, [1, 1]);
        assert_eq!(hist.excluded, 2);
        assert_eq!(hist.counts[0] + hist.counts[1] + hist.excluded, hist.samples);
    }

    #[test]
    fn test_differs_from() {
        let mut a = NodeHistogram::new(2);
        let mut b = NodeHistogram::new(2);
        a.record(PageLocation::Node(NodeId(1)));
        b.record(PageLocation::Node(NodeId(1)));
        assert!(!a.differs_from(&b));

        a.record(PageLocation::Node(NodeId(0)));
        b.record(PageLocation::Node(NodeId(1)));
        assert!(a.differs_from(&b));
    }

    #[test]
    fn test_remote_peer() {
        assert_eq!(NodeId(0).remote_peer(), NodeId(1));
        assert_eq!(NodeId(1).remote_peer(), NodeId(0));
        assert_eq!(NodeId(3).remote_peer(), NodeId(0));
    }

    #[test]
    fn test_access_report_derivation() {
        // 1 MiB of words in one second
        let report = AccessReport::new("sequential", 131_072, 1.0, 7);
        assert!((report.throughput_mbps - 1.0).abs() < 1e-9);
        assert!((report.avg_latency_ns - 1_000_000_000.0 / 131_072.0).abs() < 1e-6);
    }

    #[test]
    fn test_placement_outcome_serialization() {
        let report = PlacementReport::failed(NodeId(1), 8, PlacementOutcome::Kernel(-1));
        assert!(!report.succeeded());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"]["kind"], "kernel");
        assert_eq!(value["outcome"]["ret"], -1);

        assert!(PlacementReport::completed(NodeId(0), 8, 6).succeeded());
    }

    #[test]
    fn test_access_report_zero_time() {
        let report = AccessReport::new("random", 10, 0.0, 0);
        assert_eq!(report.throughput_mbps, 0.0);
        assert_eq!(report.avg_latency_ns, 0.0);
    }
}
