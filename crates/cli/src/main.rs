//! NUMA probe
//!
//! Allocates and faults in a memory region, then runs one test over it:
//! read-pattern benchmarks, a multi-threaded partitioned sum, or the
//! page-migration observation test.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{TestKind, TestRun};
use output::OutputFormat;
use probe_lib::numa::{LinuxNuma, NumaSystem};
use probe_lib::region::{MIB, WORD_SIZE};
use probe_lib::{MemoryRegion, ProbeLogger};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PROBE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status after an interrupt (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// NUMA memory access and page migration probe
#[derive(Parser)]
#[command(name = "numa-probe")]
#[command(author, version, about = "NUMA memory access and page migration probe", long_about = None)]
#[command(after_help = "Test types: sequential, random, stride, threads, migrate\n\
Note: sequential/random/stride tests measure both latency and throughput")]
pub struct Cli {
    /// Region size in MiB
    pub size_mb: usize,

    /// Test to run (unknown names run sequential)
    #[arg(default_value = "sequential")]
    pub test: String,

    /// Worker threads for the threads test
    pub threads: Option<usize>,

    /// Output format for benchmark reports
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Optional configuration file
    #[arg(long, env = "NUMA_PROBE_CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::ProbeConfig::load(cli.config.as_deref())?;
    init_tracing(config.json_logs());

    let kind = TestKind::resolve(&cli.test);
    let threads = cli.threads.unwrap_or(config.default_threads);
    let logger = ProbeLogger::new(kind.name());

    // Availability gate
    let system = match LinuxNuma::detect() {
        Ok(system) if system.is_available() => system,
        Ok(system) => {
            warn!(nodes = system.node_count(), "Fewer than two NUMA nodes");
            eprintln!("NUMA not available");
            std::process::exit(1);
        }
        Err(e) => {
            warn!(error = %e, "Cannot read NUMA topology");
            eprintln!("NUMA not available");
            std::process::exit(1);
        }
    };

    debug!(
        nodes = ?system.topology().nodes().collect::<Vec<_>>(),
        page_size = system.page_size(),
        "NUMA topology"
    );

    let elements = cli.size_mb.saturating_mul(MIB) / WORD_SIZE;
    logger.log_startup(PROBE_VERSION, cli.size_mb, elements, system.node_count());

    let format = cli.format;
    let size_mb = cli.size_mb;
    let task = tokio::task::spawn_blocking(move || -> Result<()> {
        output::print_progress(
            &format!("Allocating {} MB ({} elements)...", size_mb, elements),
            format,
        );
        output::print_progress("Initializing array...", format);
        let mut region = MemoryRegion::allocate(size_mb).context("Memory allocation failed")?;
        output::print_progress("Initialization complete.\n", format);

        let test = TestRun {
            kind,
            threads,
            format,
            system: &system,
        };
        commands::run(&test, &mut region)?;

        output::print_progress("\nTest completed successfully", format);
        Ok(())
    });

    tokio::select! {
        joined = task => {
            joined.context("Test task failed")??;
            logger.log_shutdown("test completed");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for interrupt")?;
            logger.log_shutdown("SIGINT received");
            info!("Interrupted before the test finished");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }

    Ok(())
}

/// Initialize tracing on stderr; stdout carries only test output
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
