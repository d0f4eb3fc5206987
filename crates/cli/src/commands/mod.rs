//! Test selection and dispatch

pub mod access;
pub mod migrate;

use crate::output::OutputFormat;
use anyhow::Result;
use probe_lib::numa::NumaSystem;
use probe_lib::MemoryRegion;
use std::fmt;
use tracing::warn;

/// Test run against the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Sequential,
    Random,
    Stride,
    Threads,
    Migrate,
}

impl TestKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sequential" => Some(TestKind::Sequential),
            "random" => Some(TestKind::Random),
            "stride" => Some(TestKind::Stride),
            "threads" => Some(TestKind::Threads),
            "migrate" => Some(TestKind::Migrate),
            _ => None,
        }
    }

    /// Resolve a test name, running the sequential test for unknown names
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!(
                event = "unknown_test",
                requested = %name,
                "Unknown test type, running sequential"
            );
            TestKind::Sequential
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestKind::Sequential => "sequential",
            TestKind::Random => "random",
            TestKind::Stride => "stride",
            TestKind::Threads => "threads",
            TestKind::Migrate => "migrate",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a test needs to run
pub struct TestRun<'a> {
    pub kind: TestKind,
    pub threads: usize,
    pub format: OutputFormat,
    pub system: &'a dyn NumaSystem,
}

/// Run the selected test over `region`
pub fn run(test: &TestRun<'_>, region: &mut MemoryRegion) -> Result<()> {
    match test.kind {
        TestKind::Sequential | TestKind::Random | TestKind::Stride => {
            access::run_pattern(test.kind, region, test.format)
        }
        TestKind::Threads => access::run_threads(region, test.threads, test.format),
        TestKind::Migrate => migrate::run_migration(test.system, region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        for kind in [
            TestKind::Sequential,
            TestKind::Random,
            TestKind::Stride,
            TestKind::Threads,
            TestKind::Migrate,
        ] {
            assert_eq!(TestKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_sequential() {
        assert_eq!(TestKind::from_name("latency"), None);
        assert_eq!(TestKind::resolve("latency"), TestKind::Sequential);
        assert_eq!(TestKind::resolve("Random"), TestKind::Sequential);
    }
}
