//! Access-pattern and partitioned sum benchmarks

use super::TestKind;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use probe_lib::migration::FIXED_SEED;
use probe_lib::{bench, MemoryRegion, ProbeLogger};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Run one of the single-threaded read benchmarks
pub fn run_pattern(kind: TestKind, region: &MemoryRegion, format: OutputFormat) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(FIXED_SEED);
    let data = region.as_slice();

    let report = match kind {
        TestKind::Sequential => bench::sequential(data, &mut rng),
        TestKind::Random => bench::random(data, &mut rng)?,
        TestKind::Stride => bench::stride(data, &mut rng)?,
        other => bail!("{} is not an access-pattern test", other),
    };

    ProbeLogger::new(kind.name()).log_access_report(&report);
    output::print_access_report(&report, format)
}

/// Run the multi-threaded partitioned sum
pub fn run_threads(region: &MemoryRegion, threads: usize, format: OutputFormat) -> Result<()> {
    let (reports, total_secs) = bench::parallel_sum(region.as_slice(), threads)?;

    ProbeLogger::new(TestKind::Threads.name()).log_threads(&reports, total_secs);
    output::print_threads(&reports, total_secs, format)
}
