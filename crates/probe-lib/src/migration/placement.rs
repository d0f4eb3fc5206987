//! Forced page placement
//!
//! Moves every page of a region to one node with a single batched
//! `move_pages` request, then pauses so the kernel can finish before the
//! first sample is taken. Every failure here is soft: the report says how
//! many pages landed and the test carries on with whatever placement
//! actually resulted.

use crate::models::{NodeId, PlacementOutcome, PlacementReport};
use crate::numa::{NumaError, NumaSystem, PageStatus};
use crate::region::MemoryRegion;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Forces a region's pages onto a target node
pub struct PlacementEnforcer<'a, S: NumaSystem + ?Sized> {
    system: &'a S,
    settle: Duration,
}

impl<'a, S: NumaSystem + ?Sized> PlacementEnforcer<'a, S> {
    pub fn new(system: &'a S, settle: Duration) -> Self {
        Self { system, settle }
    }

    /// Migrate every page of `region` to `target`
    ///
    /// Pauses for the settle time after any request the kernel saw; a
    /// request that could not be built returns at once.
    pub fn force_to(&self, region: &MemoryRegion, target: NodeId) -> PlacementReport {
        let page_size = self.system.page_size();
        let requested = region.page_count(page_size);

        let report = match self.build_request(region, target, requested) {
            Ok(mut pages) => self.submit(&mut pages, target),
            Err(e) => scratch_failed(target, requested, &e),
        };

        if report.outcome != PlacementOutcome::ScratchAllocation {
            self.system.sleep(self.settle);
        }
        report
    }

    fn build_request(
        &self,
        region: &MemoryRegion,
        target: NodeId,
        requested: usize,
    ) -> Result<Vec<PageStatus>, NumaError> {
        let mut pages = Vec::new();
        pages
            .try_reserve_exact(requested)
            .map_err(|_| NumaError::Allocation(requested))?;
        pages.extend(
            region
                .page_addrs(self.system.page_size())
                .map(|addr| PageStatus::new(addr, target)),
        );
        Ok(pages)
    }

    fn submit(&self, pages: &mut [PageStatus], target: NodeId) -> PlacementReport {
        let requested = pages.len();

        match self.system.move_pages(pages) {
            Ok(0) => {
                let moved = pages.iter().filter(|p| p.landed()).count();
                if moved < requested {
                    info!(
                        event = "placement_partial",
                        target = target.0,
                        moved,
                        requested,
                        unmovable = requested - moved,
                        "Some pages could not be migrated"
                    );
                } else {
                    debug!(target = target.0, moved, "All pages placed");
                }
                PlacementReport::completed(target, requested, moved)
            }
            Ok(not_migrated) => {
                warn!(
                    event = "placement_failed",
                    target = target.0,
                    not_migrated,
                    requested,
                    "move_pages left pages behind"
                );
                PlacementReport::failed(
                    target,
                    requested,
                    PlacementOutcome::Kernel(not_migrated as i64),
                )
            }
            Err(e @ NumaError::Allocation(_)) => scratch_failed(target, requested, &e),
            Err(e) => {
                warn!(
                    event = "placement_failed",
                    target = target.0,
                    requested,
                    error = %e,
                    "move_pages failed, placement may be partial"
                );
                PlacementReport::failed(target, requested, PlacementOutcome::Kernel(-1))
            }
        }
    }
}

fn scratch_failed(target: NodeId, requested: usize, error: &NumaError) -> PlacementReport {
    warn!(
        event = "placement_failed",
        target = target.0,
        requested,
        error = %error,
        "Cannot allocate arrays for migration"
    );
    PlacementReport::failed(target, requested, PlacementOutcome::ScratchAllocation)
}
