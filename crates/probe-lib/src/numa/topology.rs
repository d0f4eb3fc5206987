//! NUMA topology discovery from sysfs
//!
//! Reads the node directories under `/sys/devices/system/node`:
//! - `nodeN/` for each online node
//! - `nodeN/cpulist` for the CPUs belonging to that node

use super::NumaError;
use crate::models::NodeId;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default sysfs directory holding one `nodeN` entry per NUMA node
pub const DEFAULT_SYSFS_NODE_ROOT: &str = "/sys/devices/system/node";

/// Node to CPU mapping of the machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumaTopology {
    nodes: BTreeMap<NodeId, Vec<usize>>,
}

impl NumaTopology {
    /// Build a topology from explicit node to CPU lists
    pub fn from_nodes(nodes: impl IntoIterator<Item = (NodeId, Vec<usize>)>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Read the topology from a sysfs node directory
    ///
    /// A node without a readable `cpulist` (memory-only node) is kept with
    /// no CPUs.
    pub fn from_sysfs(root: &Path) -> Result<Self, NumaError> {
        let entries = fs::read_dir(root).map_err(|source| NumaError::Topology {
            path: root.to_path_buf(),
            source,
        })?;

        let mut nodes = BTreeMap::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(id) = parse_node_dir_name(&name) else {
                continue;
            };

            let cpus = match fs::read_to_string(entry.path().join("cpulist")) {
                Ok(content) => parse_cpulist(&content)?,
                Err(_) => Vec::new(),
            };
            nodes.insert(NodeId(id), cpus);
        }

        Ok(Self { nodes })
    }

    /// Number of nodes found
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Node owning `cpu`, if any
    pub fn node_of_cpu(&self, cpu: usize) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, cpus)| cpus.contains(&cpu))
            .map(|(node, _)| *node)
    }
}

/// Parse `node<N>` directory names
fn parse_node_dir_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("node")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a kernel cpulist such as `0-3,8,10-11`
pub fn parse_cpulist(content: &str) -> Result<Vec<usize>, NumaError> {
    let content = content.trim();
    let mut cpus = Vec::new();
    if content.is_empty() {
        return Ok(cpus);
    }

    let invalid = || NumaError::InvalidCpuList(content.to_string());

    for part in content.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.parse().map_err(|_| invalid())?;
                let hi: usize = hi.parse().map_err(|_| invalid())?;
                if lo > hi {
                    return Err(invalid());
                }
                cpus.extend(lo..=hi);
            }
            None => cpus.push(part.parse().map_err(|_| invalid())?),
        }
    }

    Ok(cpus)
}
