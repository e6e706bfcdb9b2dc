//! Integration tests for downstream extraction against a saved status page.

use arris_modem_exporter::modem::{extract_downstream, MetricField, MetricValue};
use arris_modem_exporter::{CollectorError, DownstreamCollector, FileFetcher};
use std::collections::HashSet;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/status_cgi.html")
}

fn fixture() -> Vec<u8> {
    std::fs::read(fixture_path()).expect("fixture should exist")
}

#[test]
fn test_fixture_yields_all_downstream_channels() {
    let samples = extract_downstream(&fixture()).unwrap();
    assert_eq!(samples.len(), 8);

    let first = &samples[0];
    assert_eq!(first.frequency, 55500.0);
    assert_eq!(first.power, 350.0);
    assert_eq!(first.signal_to_noise, 4037.0);
    assert_eq!(first.octets, 2543216478);
    assert_eq!(first.corrected_errors, 12);
    assert_eq!(first.uncorrected_errors, 0);

    let sixth = &samples[5];
    assert_eq!(sixth.power, -40.0);
    assert_eq!(sixth.uncorrected_errors, 41);
}

#[test]
fn test_extraction_is_deterministic() {
    let raw = fixture();
    assert_eq!(
        extract_downstream(&raw).unwrap(),
        extract_downstream(&raw).unwrap()
    );
}

#[test]
fn test_poll_keys_are_zero_based_and_series_one_based() {
    let mut collector = DownstreamCollector::new("file://status", FileFetcher::new(fixture_path()));
    let data = collector.poll().unwrap();

    assert_eq!(data.len(), 8 * 6);
    assert_eq!(
        data.get("downstream_0_frequency"),
        Some(&MetricValue::Float(55500.0))
    );
    assert_eq!(
        data.get("downstream_7_octets"),
        Some(&MetricValue::Integer(2233445566))
    );
    assert!(data.get("downstream_8_octets").is_none());

    let series = collector.series();
    assert_eq!(series.channel_count(), 8);
    let first = series.series_for_row(MetricField::Frequency, 0).unwrap();
    assert_eq!(first.id, "downstream_1_frequency");
    assert_eq!(first.scale(55500.0), 555.0);
    assert!(series.series_ids().any(|id| id == "downstream_8_uncorrected_errors"));
}

#[test]
fn test_series_ids_are_unique() {
    let mut collector = DownstreamCollector::new("file://status", FileFetcher::new(fixture_path()));
    collector.poll().unwrap();

    let ids: Vec<&str> = collector.series().series_ids().collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 48);
    assert_eq!(unique.len(), 48);
}

#[test]
fn test_page_without_downstream_table_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.html");
    std::fs::write(&path, "<html><body><h4>Upstream</h4><table></table></body></html>").unwrap();

    let mut collector = DownstreamCollector::new("file://status", FileFetcher::new(&path));
    assert!(matches!(collector.poll(), Err(CollectorError::EmptyData)));
    assert!(!collector.check());
    assert!(!collector.series().is_declared());
}

#[test]
fn test_missing_file_is_transport_error() {
    let mut collector = DownstreamCollector::new(
        "file://status",
        FileFetcher::new("/nonexistent/status_cgi.html"),
    );
    let err = collector.poll().unwrap_err();
    assert_eq!(err.reason(), "transport");
}
