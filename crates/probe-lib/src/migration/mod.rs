//! Page-migration observation
//!
//! Places a region on the wrong NUMA node, drives read-modify-write
//! pressure from the local CPU and samples where its pages live after
//! every burst, streaming one CSV row per iteration.

mod oracle;
mod placement;
mod pressure;
mod report;
mod runner;
mod sampler;


pub use oracle::locate;
pub use placement::PlacementEnforcer;
pub use pressure::PressureDriver;
pub use report::MigrationReport;
pub use runner::{MigrationTest, Phase};
pub use sampler::{sample_count, DistributionSampler};

use std::time::Duration;

/// Seed of the index stream shared by every access loop
pub const FIXED_SEED: u64 = 12345;

/// Pressure/sample cycles per test
pub const DEFAULT_ITERATIONS: usize = 400;

/// Read-modify-write accesses per pressure burst
pub const DEFAULT_ACCESSES_PER_BURST: usize = 400_000;

/// Pause between a burst and its sample
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Pause after forcing placement, before the baseline sample
pub const DEFAULT_PLACEMENT_SETTLE: Duration = Duration::from_secs(1);

/// Share of the elements sampled per distribution check
pub const SAMPLE_FRACTION: f64 = 0.001;

/// Lower bound on samples per distribution check
pub const MIN_SAMPLES: usize = 100;

/// Upper bound on samples per distribution check
pub const MAX_SAMPLES: usize = 10_000;

/// Parameters of a migration test
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub iterations: usize,
    pub accesses_per_burst: usize,
    pub settle_delay: Duration,
    pub placement_settle: Duration,
    pub seed: u64,
    /// Move the region to the remote node before the baseline sample
    pub force_remote: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            accesses_per_burst: DEFAULT_ACCESSES_PER_BURST,
            settle_delay: DEFAULT_SETTLE_DELAY,
            placement_settle: DEFAULT_PLACEMENT_SETTLE,
            seed: FIXED_SEED,
            force_remote: true,
        }
    }
}

/// Builder for migration test parameters
#[derive(Debug, Clone, Default)]
pub struct MigrationConfigBuilder {
    config: MigrationConfig,
}

impl MigrationConfigBuilder {
    /// Start from the default constants
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    pub fn accesses_per_burst(mut self, accesses: usize) -> Self {
        self.config.accesses_per_burst = accesses;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn placement_settle(mut self, delay: Duration) -> Self {
        self.config.placement_settle = delay;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn force_remote(mut self, force: bool) -> Self {
        self.config.force_remote = force;
        self
    }

    pub fn build(self) -> MigrationConfig {
        self.config
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_migration_config_default() {
        let config = MigrationConfig::default();
        assert_eq!(config.iterations, 400);
        assert_eq!(config.accesses_per_burst, 400_000);
        assert_eq!(config.settle_delay, Duration::from_millis(50));
        assert_eq!(config.placement_settle, Duration::from_secs(1));
        assert_eq!(config.seed, 12345);
        assert!(config.force_remote);
    }

    #[test]
    fn test_migration_config_builder() {
        let config = MigrationConfigBuilder::new()
            .iterations(3)
            .accesses_per_burst(10)
            .settle_delay(Duration::ZERO)
            .force_remote(false)
            .build();

        assert_eq!(config.iterations, 3);
        assert_eq!(config.accesses_per_burst, 10);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.placement_settle, DEFAULT_PLACEMENT_SETTLE);
        assert!(!config.force_remote);
    }
}
