//! Harness configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Prefix of the environment variables read by the harness
pub const ENV_PREFIX: &str = "NUMA_PROBE";

/// Ambient settings that are not part of the command line
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Log output format: `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Worker count of the threads test when none is given
    #[serde(default = "default_threads")]
    pub default_threads: usize,
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_threads() -> usize {
    probe_lib::bench::DEFAULT_THREADS
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            default_threads: default_threads(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from an optional file and `NUMA_PROBE_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_sources(file, ENV_PREFIX)
    }

    fn from_sources(file: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(prefix))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let config = ProbeConfig::from_sources(None, "NUMA_PROBE_TEST_UNSET").unwrap();
        assert_eq!(config.log_format, "text");
        assert_eq!(config.default_threads, 4);
        assert!(!config.json_logs());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("NUMA_PROBE_TEST_ENV_LOG_FORMAT", "JSON");
        std::env::set_var("NUMA_PROBE_TEST_ENV_DEFAULT_THREADS", "8");

        let config = ProbeConfig::from_sources(None, "NUMA_PROBE_TEST_ENV").unwrap();
        assert!(config.json_logs());
        assert_eq!(config.default_threads, 8);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_threads = 2").unwrap();

        let config =
            ProbeConfig::from_sources(Some(file.path()), "NUMA_PROBE_TEST_FILE").unwrap();
        assert_eq!(config.default_threads, 2);
        assert_eq!(config.log_format, "text");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ProbeConfig::from_sources(Some(&missing), "NUMA_PROBE_TEST_MISSING").is_err());
    }
}
