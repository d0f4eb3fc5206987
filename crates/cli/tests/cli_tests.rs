//! CLI integration tests

use std::process::Command;

fn probe(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "numa-probe", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = probe(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("NUMA"), "Should describe the tool");
    assert!(stdout.contains("<SIZE_MB>"), "Should show size argument");
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(
        stdout.contains("sequential, random, stride, threads, migrate"),
        "Should list test types"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = probe(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("numa-probe"), "Should show binary name");
}

/// Test that the region size is required
#[test]
fn test_missing_argument() {
    let output = probe(&[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing size should fail");
    assert!(stderr.contains("Usage"), "Should print usage");
}

/// Test that a non-numeric size is rejected
#[test]
fn test_invalid_size() {
    let output = probe(&["lots"]);

    assert!(!output.status.success(), "Non-numeric size should fail");
}

/// Test that an unknown output format is rejected
#[test]
fn test_invalid_format() {
    let output = probe(&["--format", "xml", "16"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown format should fail");
    assert!(stderr.contains("xml"), "Should name the rejected value");
}
