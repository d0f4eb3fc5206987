//! Page-migration test

use anyhow::Result;
use probe_lib::migration::{MigrationConfig, MigrationTest};
use probe_lib::numa::NumaSystem;
use probe_lib::MemoryRegion;
use std::io;

/// Run the migration test with the default parameters, streaming to stdout
///
/// The stream has a fixed line format in every output mode.
pub fn run_migration(system: &dyn NumaSystem, region: &mut MemoryRegion) -> Result<()> {
    let stdout = io::stdout();
    MigrationTest::new(system, MigrationConfig::default()).run(region, stdout.lock())?;
    Ok(())
}
