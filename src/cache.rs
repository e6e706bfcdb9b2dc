//! Snapshot of the latest poll.
//!
//! The poller replaces the snapshot after every cycle; HTTP handlers only read
//! it. A failed cycle keeps the last good data but flags it as stale.

use arris_modem_exporter::modem::{ChartSeriesSet, FlatData};
use arris_modem_exporter::CollectorError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Latest poll outcome and data.
#[derive(Clone, Default, Serialize)]
pub struct PollSnapshot {
    pub url: String,
    pub success: bool,
    pub last_error: Option<String>,
    pub polled_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
    pub channel_count: usize,
    pub data: FlatData,
    #[serde(skip)]
    pub series: ChartSeriesSet,
}

impl PollSnapshot {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, data: FlatData, series: &ChartSeriesSet, duration_seconds: f64) {
        let now = Utc::now();
        self.success = true;
        self.last_error = None;
        self.polled_at = Some(now);
        self.last_success_at = Some(now);
        self.duration_seconds = duration_seconds;
        self.channel_count = series.channel_count();
        self.data = data;
        self.series = series.clone();
    }

    pub fn record_failure(&mut self, error: &CollectorError, duration_seconds: f64) {
        self.success = false;
        self.last_error = Some(error.to_string());
        self.polled_at = Some(Utc::now());
        self.duration_seconds = duration_seconds;
    }
}
