//! Migration test orchestration
//!
//! Runs the test as a fixed sequence of phases:
//! `Init -> ForcedRemote -> Baseline -> Iterating -> Finalizing -> Done`.
//! Access time is accumulated strictly around the pressure bursts; the
//! settle delay and sampling only count toward wall time.

use super::{
    DistributionSampler, MigrationConfig, MigrationReport, PlacementEnforcer, PressureDriver,
};
use crate::clock::Stopwatch;
use crate::models::{IterationRecord, MigrationSummary, NodeId};
use crate::numa::NumaSystem;
use crate::observability::ProbeLogger;
use crate::region::MemoryRegion;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::io::Write;
use tracing::{debug, warn};

/// Phase of a running migration test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    ForcedRemote,
    Baseline,
    Iterating,
    Finalizing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::ForcedRemote => "forced_remote",
            Phase::Baseline => "baseline",
            Phase::Iterating => "iterating",
            Phase::Finalizing => "finalizing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Page-migration test over one region
pub struct MigrationTest<'a, S: NumaSystem + ?Sized> {
    system: &'a S,
    config: MigrationConfig,
    logger: ProbeLogger,
    phase: Phase,
}

impl<'a, S: NumaSystem + ?Sized> MigrationTest<'a, S> {
    pub fn new(system: &'a S, config: MigrationConfig) -> Self {
        Self {
            system,
            config,
            logger: ProbeLogger::new("migrate"),
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "Migration test phase");
        self.phase = phase;
    }

    /// Run the test, streaming its output to `out`
    pub fn run<W: Write>(&mut self, region: &mut MemoryRegion, out: W) -> Result<MigrationSummary> {
        self.run_observed(region, out, |_| {})
    }

    /// Run the test, also handing every iteration record to `observer`
    pub fn run_observed<W: Write>(
        &mut self,
        region: &mut MemoryRegion,
        out: W,
        mut observer: impl FnMut(&IterationRecord),
    ) -> Result<MigrationSummary> {
        let started_at = chrono::Utc::now();
        let mut report = MigrationReport::new(out);

        // Init
        self.phase = Phase::Init;
        let (cpu, local_node) = self.locate_self();
        let remote_node = local_node.remote_peer();
        report.banner(cpu, local_node)?;

        // ForcedRemote
        self.enter(Phase::ForcedRemote);
        let placement = if self.config.force_remote {
            report.forcing(remote_node)?;
            let enforcer = PlacementEnforcer::new(self.system, self.config.placement_settle);
            let placement = enforcer.force_to(region, remote_node);
            report.placement(&placement)?;
            self.logger.log_placement(&placement);
            Some(placement)
        } else {
            None
        };

        // Baseline
        self.enter(Phase::Baseline);
        let sampler = DistributionSampler::for_region(self.system, region);
        report.sampling(sampler.samples())?;
        let initial = sampler.sample(region);
        report.initial_distribution(&initial)?;

        // Iterating
        self.enter(Phase::Iterating);
        report.begin_iterations()?;

        let driver = PressureDriver::new(self.config.accesses_per_burst);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut checksum = 0i64;
        let mut pure_access_secs = 0.0;
        let phase_watch = Stopwatch::start();

        for iteration in 0..self.config.iterations {
            let iteration_watch = Stopwatch::start();

            let access_secs = driver.apply(region.as_mut_slice(), &mut rng, &mut checksum);
            pure_access_secs += access_secs;

            self.system.sleep(self.config.settle_delay);

            let histogram = sampler.sample(region);
            let record = IterationRecord::from_histogram(
                iteration,
                access_secs,
                iteration_watch.elapsed_secs(),
                &histogram,
            );
            report.iteration(&record)?;
            observer(&record);
        }

        let total_wall_secs = phase_watch.elapsed_secs();

        // Finalizing
        self.enter(Phase::Finalizing);
        let final_distribution = sampler.sample(region);
        let summary = MigrationSummary {
            started_at,
            cpu,
            local_node,
            remote_node,
            placement,
            sample_count: sampler.samples(),
            initial,
            migration_occurred: final_distribution.differs_from(&initial),
            final_distribution,
            iterations: self.config.iterations,
            pure_access_secs,
            total_wall_secs,
            checksum,
        };

        // Done
        self.enter(Phase::Done);
        report.summary(&summary)?;
        self.logger.log_migration_summary(&summary);

        Ok(summary)
    }

    /// CPU the test runs on and its node
    ///
    /// Falls back to CPU 0 on node 0 when the environment cannot say.
    fn locate_self(&self) -> (usize, NodeId) {
        let cpu = match self.system.current_cpu() {
            Ok(cpu) => cpu,
            Err(e) => {
                warn!(error = %e, "Cannot determine current CPU, assuming CPU 0");
                0
            }
        };

        let node = match self.system.node_of_cpu(cpu) {
            Ok(node) => node,
            Err(e) => {
                warn!(cpu, error = %e, "Cannot map CPU to a node, assuming node 0");
                NodeId(0)
            }
        };

        (cpu, node)
    }
}
