//! NUMA capabilities of the execution environment
//!
//! This module provides the seam between the harness and the kernel:
//! topology discovery, the current CPU, page-location queries and batched
//! forced page migration. The Linux implementation reads sysfs and issues
//! `getcpu`/`move_pages` directly; a simulated implementation backs the
//! tests.

mod linux;
mod simulated;
mod topology;

pub use linux::LinuxNuma;
pub use simulated::SimulatedNuma;
pub use topology::{parse_cpulist, NumaTopology, DEFAULT_SYSFS_NODE_ROOT};

use crate::models::NodeId;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by NUMA capability queries
#[derive(Debug, Error)]
pub enum NumaError {
    #[error("NUMA not available: {0}")]
    Unavailable(String),

    #[error("{call} failed: {source}")]
    Syscall {
        call: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read NUMA topology from {}: {source}", path.display())]
    Topology {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid cpulist '{0}'")]
    InvalidCpuList(String),

    #[error("CPU {0} does not belong to any NUMA node")]
    UnknownCpu(usize),

    #[error("Failed to allocate scratch arrays for {0} pages")]
    Allocation(usize),
}

impl NumaError {
    /// Wrap the calling thread's last OS error
    pub fn last_os_error(call: &'static str) -> Self {
        NumaError::Syscall {
            call,
            source: io::Error::last_os_error(),
        }
    }
}

/// One page slot of a batched migration request
///
/// The kernel fills `result` with the node the page ended up on, or with a
/// negative errno when the page could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStatus {
    pub addr: usize,
    pub requested: NodeId,
    pub result: i32,
}

impl PageStatus {
    pub fn new(addr: usize, requested: NodeId) -> Self {
        Self {
            addr,
            requested,
            result: i32::MIN,
        }
    }

    /// True when the page reports the node it was asked to move to
    pub fn landed(&self) -> bool {
        self.result >= 0 && self.result as u32 == self.requested.0
    }
}

/// NUMA capabilities consumed by the probe
pub trait NumaSystem: Send + Sync {
    /// Number of online NUMA nodes
    fn node_count(&self) -> usize;

    /// True when the environment has a multi-node topology
    fn is_available(&self) -> bool {
        self.node_count() > 1
    }

    /// CPU the calling thread is running on
    fn current_cpu(&self) -> Result<usize, NumaError>;

    /// Node a CPU belongs to
    fn node_of_cpu(&self, cpu: usize) -> Result<NodeId, NumaError>;

    /// Size of an OS page in bytes
    fn page_size(&self) -> usize;

    /// Node currently backing the page that contains `addr`, without moving it
    fn query_page_node(&self, addr: usize) -> Result<NodeId, NumaError>;

    /// Force every page in `pages` to its requested node in a single batch
    ///
    /// Fills each `result` and returns the number of pages the kernel
    /// reported as not migrated.
    fn move_pages(&self, pages: &mut [PageStatus]) -> Result<usize, NumaError>;

    /// Block the calling thread
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
