//! Linux NUMA backend
//!
//! Topology comes from sysfs; the current CPU from `sched_getcpu()`; page
//! placement is queried and changed with the `move_pages()` syscall:
//! - with a null node array it only reports where each page lives
//! - with a node array and `MPOL_MF_MOVE` it migrates pages even while
//!   they are mapped by the calling process

use super::{NumaError, NumaSystem, NumaTopology, PageStatus, DEFAULT_SYSFS_NODE_ROOT};
use crate::models::NodeId;
use std::path::Path;
use tracing::debug;

/// Move pages mapped by this process (linux/mempolicy.h)
#[cfg(target_os = "linux")]
const MPOL_MF_MOVE: libc::c_int = 1 << 1;

/// Page size assumed when sysconf cannot report one
const FALLBACK_PAGE_SIZE: usize = 4096;

/// NUMA backend for the running Linux kernel
#[derive(Debug, Clone)]
pub struct LinuxNuma {
    topology: NumaTopology,
    page_size: usize,
}

impl LinuxNuma {
    /// Discover the topology of this machine
    pub fn detect() -> Result<Self, NumaError> {
        Self::from_sysfs(Path::new(DEFAULT_SYSFS_NODE_ROOT))
    }

    /// Discover the topology from a custom sysfs node directory
    pub fn from_sysfs(root: &Path) -> Result<Self, NumaError> {
        let topology = NumaTopology::from_sysfs(root)?;
        let page_size = system_page_size();
        debug!(
            nodes = topology.node_count(),
            page_size,
            root = %root.display(),
            "Loaded NUMA topology"
        );
        Ok(Self {
            topology,
            page_size,
        })
    }

    pub fn topology(&self) -> &NumaTopology {
        &self.topology
    }
}

fn system_page_size() -> usize {
    // SAFETY: sysconf has no preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

impl NumaSystem for LinuxNuma {
    fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    #[cfg(target_os = "linux")]
    fn current_cpu(&self) -> Result<usize, NumaError> {
        // SAFETY: sched_getcpu has no preconditions
        let cpu = unsafe { libc::sched_getcpu() };
        if cpu < 0 {
            return Err(NumaError::last_os_error("sched_getcpu"));
        }
        Ok(cpu as usize)
    }

    #[cfg(not(target_os = "linux"))]
    fn current_cpu(&self) -> Result<usize, NumaError> {
        Err(NumaError::Unavailable(
            "current CPU query requires Linux".to_string(),
        ))
    }

    fn node_of_cpu(&self, cpu: usize) -> Result<NodeId, NumaError> {
        self.topology
            .node_of_cpu(cpu)
            .ok_or(NumaError::UnknownCpu(cpu))
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    #[cfg(target_os = "linux")]
    fn query_page_node(&self, addr: usize) -> Result<NodeId, NumaError> {
        let mut pages = [addr as *mut libc::c_void];
        let mut status: [libc::c_int; 1] = [-1];

        // SAFETY: one page pointer and one status slot, node array is null
        // so the kernel only reports placement
        let ret = unsafe {
            libc::syscall(
                libc::SYS_move_pages,
                0 as libc::c_int,
                1 as libc::c_ulong,
                pages.as_mut_ptr(),
                std::ptr::null::<libc::c_int>(),
                status.as_mut_ptr(),
                0 as libc::c_int,
            )
        };

        if ret != 0 {
            return Err(NumaError::last_os_error("move_pages"));
        }
        if status[0] < 0 {
            return Err(NumaError::Syscall {
                call: "move_pages",
                source: std::io::Error::from_raw_os_error(-status[0]),
            });
        }
        Ok(NodeId(status[0] as u32))
    }

    #[cfg(not(target_os = "linux"))]
    fn query_page_node(&self, _addr: usize) -> Result<NodeId, NumaError> {
        Err(NumaError::Unavailable(
            "page location query requires Linux".to_string(),
        ))
    }

    #[cfg(target_os = "linux")]
    fn move_pages(&self, pages: &mut [PageStatus]) -> Result<usize, NumaError> {
        let count = pages.len();
        if count == 0 {
            return Ok(0);
        }

        let mut addrs: Vec<*mut libc::c_void> = Vec::new();
        let mut nodes: Vec<libc::c_int> = Vec::new();
        let mut status: Vec<libc::c_int> = Vec::new();
        addrs
            .try_reserve_exact(count)
            .and_then(|_| nodes.try_reserve_exact(count))
            .and_then(|_| status.try_reserve_exact(count))
            .map_err(|_| NumaError::Allocation(count))?;

        for page in pages.iter() {
            addrs.push(page.addr as *mut libc::c_void);
            nodes.push(page.requested.0 as libc::c_int);
        }
        status.resize(count, -1);

        // SAFETY: all three arrays hold exactly `count` elements
        let ret = unsafe {
            libc::syscall(
                libc::SYS_move_pages,
                0 as libc::c_int,
                count as libc::c_ulong,
                addrs.as_mut_ptr(),
                nodes.as_ptr(),
                status.as_mut_ptr(),
                MPOL_MF_MOVE,
            )
        };

        if ret < 0 {
            return Err(NumaError::last_os_error("move_pages"));
        }

        for (page, result) in pages.iter_mut().zip(status) {
            page.result = result;
        }
        Ok(ret as usize)
    }

    #[cfg(not(target_os = "linux"))]
    fn move_pages(&self, _pages: &mut [PageStatus]) -> Result<usize, NumaError> {
        Err(NumaError::Unavailable(
            "page migration requires Linux".to_string(),
        ))
    }
}
