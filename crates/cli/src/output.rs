//! Output formatting for benchmark reports
//!
//! Text output keeps the line shapes existing result parsers expect; JSON
//! output is one pretty-printed document per report.

use anyhow::{Context, Result};
use clap::ValueEnum;
use probe_lib::{AccessReport, ThreadReport};
use serde::Serialize;

/// Output format for benchmark reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text lines (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl OutputFormat {
    pub fn is_text(self) -> bool {
        self == OutputFormat::Text
    }
}

/// Partitioned sum results as emitted in JSON
#[derive(Serialize)]
struct ThreadsOutput<'a> {
    threads: usize,
    workers: &'a [ThreadReport],
    total_secs: f64,
}

/// Section header for an access pattern
fn pattern_header(pattern: &str) -> String {
    match pattern {
        "sequential" => "=== Sequential Access Pattern ===".to_string(),
        "random" => "=== Random Access Pattern ===".to_string(),
        "stride" => format!(
            "=== Stride Access Pattern (stride={}) ===",
            probe_lib::bench::STRIDE
        ),
        other => format!("=== {} Access Pattern ===", other),
    }
}

/// Render an access report as text
pub fn format_access_report(report: &AccessReport) -> String {
    let qualifier = match report.pattern.as_str() {
        "random" => format!(" ({} random accesses)", report.accesses),
        "stride" => format!(" ({} strided accesses)", report.accesses),
        _ => String::new(),
    };

    format!(
        "{}\nThroughput: {:.2} MB/s{}\nAverage latency: {:.2} ns per access\nTime: {:.3} seconds\nSum (prevent optimization): {}",
        pattern_header(&report.pattern),
        report.throughput_mbps,
        qualifier,
        report.avg_latency_ns,
        report.time_secs,
        report.checksum
    )
}

/// Render partitioned sum results as text
pub fn format_threads(reports: &[ThreadReport], total_secs: f64) -> String {
    let mut lines = vec![format!(
        "=== Multi-threaded Test ({} threads) ===",
        reports.len()
    )];
    lines.extend(reports.iter().map(|r| {
        format!(
            "Thread {}: sum={}, time={:.3}s",
            r.thread_id, r.sum, r.time_secs
        )
    }));
    lines.push(format!("Total parallel time: {:.3} seconds", total_secs));
    lines.join("\n")
}

/// Print an access report
pub fn print_access_report(report: &AccessReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", format_access_report(report)),
        OutputFormat::Json => print_json(report)?,
    }
    Ok(())
}

/// Print partitioned sum results
pub fn print_threads(reports: &[ThreadReport], total_secs: f64, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", format_threads(reports, total_secs)),
        OutputFormat::Json => print_json(&ThreadsOutput {
            threads: reports.len(),
            workers: reports,
            total_secs,
        })?,
    }
    Ok(())
}

/// Print a progress line; suppressed in JSON mode so stdout stays parseable
pub fn print_progress(message: &str, format: OutputFormat) {
    if format.is_text() {
        println!("{}", message);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
