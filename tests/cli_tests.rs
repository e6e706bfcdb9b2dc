//! Integration tests for the command line interface.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

/// Helper to get the binary path
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_arris-modem-exporter"))
}

fn fixture_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/status_cgi.html")
        .to_string_lossy()
        .into_owned()
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_default_config_is_valid() {
    let output = run(&["--no-config", "--check-config"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Configuration is valid"));
}

#[test]
fn test_empty_url_is_rejected() {
    let output = run(&["--no-config", "--url", "", "--check-config"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(
        stderr.contains("URL is not defined or type is not <str>"),
        "unexpected stderr: '{}'",
        stderr
    );
}

#[test]
fn test_null_url_in_config_file_is_rejected() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "url: null").unwrap();

    let output = run(&["-c", file.path().to_str().unwrap(), "--check-config"]);
    assert!(!output.status.success());
}

#[test]
fn test_check_against_fixture() {
    let fixture = fixture_path();
    let output = run(&["--no-config", "-t", &fixture, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("Found 8 downstream channels"));
}

#[test]
fn test_check_fails_without_downstream_data() {
    let mut file = NamedTempFile::with_suffix(".html").unwrap();
    writeln!(file, "<html><body><p>Modem is rebooting</p></body></html>").unwrap();

    let output = run(&["--no-config", "-t", file.path().to_str().unwrap(), "check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Poll returned no data"), "stderr: {}", stderr);
}

#[test]
fn test_charts_json_declares_discovered_lines() {
    let fixture = fixture_path();
    let output = run(&["--no-config", "-t", &fixture, "charts", "--format", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let charts = json["charts"].as_array().unwrap();
    assert_eq!(charts.len(), 6);
    assert_eq!(json["order"][0], "downstream_frequency");
    for chart in charts {
        assert_eq!(chart["lines"].as_array().unwrap().len(), 8);
        assert_eq!(chart["family"], "arris");
    }
    assert_eq!(charts[1]["lines"][0]["divisor"], 100);
    assert_eq!(charts[4]["lines"][7]["algorithm"], "incremental");
}

#[test]
fn test_config_command_prints_yaml() {
    let output = run(&["--no-config", "config", "-o", "-"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("192.168.100.1/cgi-bin/status_cgi"));
    assert!(stdout.contains("port: 9216"));
}
