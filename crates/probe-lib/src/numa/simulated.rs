//! Deterministic in-process NUMA system
//!
//! Tracks the node of every page the harness touches so placement and
//! sampling logic can be exercised on machines without a multi-node
//! topology. Sleeping drives a simple balancer that moves forced-remote
//! pages back to the node of the current CPU.

use super::{NumaError, NumaSystem, NumaTopology, PageStatus};
use crate::models::NodeId;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

const SIMULATED_PAGE_SIZE: usize = 4096;

/// Simulated NUMA machine
pub struct SimulatedNuma {
    topology: NumaTopology,
    cpu: usize,
    page_size: usize,
    first_touch_node: NodeId,
    balance_per_sleep: usize,
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    /// Page number to node, for pages that have been moved at least once
    placement: BTreeMap<usize, NodeId>,
    /// Pages whose location lookup fails
    failing_lookups: HashSet<usize>,
    /// Pages that refuse to migrate
    pinned: HashSet<usize>,
    /// Next batched move fails outright
    fail_next_move: bool,
    /// Next batched move cannot allocate its scratch arrays
    oom_next_move: bool,
    sleeps: Vec<Duration>,
    lookups: usize,
}

impl SimulatedNuma {
    /// A machine with `nodes` nodes, two CPUs per node, running on CPU 0
    pub fn new(nodes: u32) -> Self {
        let topology =
            NumaTopology::from_nodes((0..nodes).map(|n| {
                let first = n as usize * 2;
                (NodeId(n), vec![first, first + 1])
            }));

        Self {
            topology,
            cpu: 0,
            page_size: SIMULATED_PAGE_SIZE,
            first_touch_node: NodeId(0),
            balance_per_sleep: 0,
            state: Mutex::new(SimState::default()),
        }
    }

    /// Run on `cpu`
    pub fn on_cpu(mut self, cpu: usize) -> Self {
        self.cpu = cpu;
        self
    }

    /// Node backing pages that were never migrated
    pub fn with_first_touch_node(mut self, node: NodeId) -> Self {
        self.first_touch_node = node;
        self
    }

    /// Pages moved to the local node on every sleep
    pub fn with_balancer(mut self, pages_per_sleep: usize) -> Self {
        self.balance_per_sleep = pages_per_sleep;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn page_of(&self, addr: usize) -> usize {
        addr / self.page_size
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make location lookups fail for the page holding `addr`
    pub fn fail_lookups_at(&self, addr: usize) {
        let page = self.page_of(addr);
        self.lock().failing_lookups.insert(page);
    }

    /// Make the page holding `addr` refuse migration
    pub fn pin_page_at(&self, addr: usize) {
        let page = self.page_of(addr);
        self.lock().pinned.insert(page);
    }

    /// Fail the next batched move with EPERM
    pub fn fail_next_move(&self) {
        self.lock().fail_next_move = true;
    }

    /// Fail the next batched move with a scratch allocation error
    pub fn exhaust_next_move(&self) {
        self.lock().oom_next_move = true;
    }

    /// Place the page holding `addr` on `node` directly
    pub fn place_at(&self, addr: usize, node: NodeId) {
        let page = self.page_of(addr);
        self.lock().placement.insert(page, node);
    }

    /// Every duration passed to `sleep`
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Number of location lookups served
    pub fn lookups(&self) -> usize {
        self.lock().lookups
    }

    fn local_node(&self) -> NodeId {
        self.topology.node_of_cpu(self.cpu).unwrap_or(NodeId(0))
    }
}

impl NumaSystem for SimulatedNuma {
    fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    fn current_cpu(&self) -> Result<usize, NumaError> {
        Ok(self.cpu)
    }

    fn node_of_cpu(&self, cpu: usize) -> Result<NodeId, NumaError> {
        self.topology
            .node_of_cpu(cpu)
            .ok_or(NumaError::UnknownCpu(cpu))
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn query_page_node(&self, addr: usize) -> Result<NodeId, NumaError> {
        let page = self.page_of(addr);
        let mut state = self.lock();
        state.lookups += 1;

        if state.failing_lookups.contains(&page) {
            return Err(NumaError::Syscall {
                call: "move_pages",
                source: io::Error::from_raw_os_error(libc::EFAULT),
            });
        }

        Ok(state
            .placement
            .get(&page)
            .copied()
            .unwrap_or(self.first_touch_node))
    }

    fn move_pages(&self, pages: &mut [PageStatus]) -> Result<usize, NumaError> {
        let mut state = self.lock();

        if std::mem::take(&mut state.oom_next_move) {
            return Err(NumaError::Allocation(pages.len()));
        }
        if std::mem::take(&mut state.fail_next_move) {
            return Err(NumaError::Syscall {
                call: "move_pages",
                source: io::Error::from_raw_os_error(libc::EPERM),
            });
        }

        for page in pages.iter_mut() {
            let number = self.page_of(page.addr);
            if state.pinned.contains(&number) {
                page.result = -libc::EBUSY;
                continue;
            }
            if (page.requested.0 as usize) >= self.topology.node_count() {
                page.result = -libc::ENODEV;
                continue;
            }
            state.placement.insert(number, page.requested);
            page.result = page.requested.0 as i32;
        }

        Ok(0)
    }

    fn sleep(&self, duration: Duration) {
        let local = self.local_node();
        let mut state = self.lock();
        state.sleeps.push(duration);

        if self.balance_per_sleep == 0 {
            return;
        }

        let pinned = state.pinned.clone();
        let remote: Vec<usize> = state
            .placement
            .iter()
            .filter(|(page, node)| **node != local && !pinned.contains(page))
            .map(|(page, _)| *page)
            .take(self.balance_per_sleep)
            .collect();

        for page in remote {
            state.placement.insert(page, local);
        }
    }
}
