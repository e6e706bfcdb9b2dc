//! Poll statistics for the exporter.
//!
//! Tracks poll outcomes, durations, discovered channel counts and HTTP
//! activity, and renders them as the plain-text table served on `/health`.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use crate::error::CollectorError;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// (last, avg, max, min, count)
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Timestamps of recent HTTP requests, pruned to the last ten minutes.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            if let Some(cutoff) = now.checked_sub(Duration::from_secs(600)) {
                while guard.front().is_some_and(|&t| t < cutoff) {
                    guard.pop_front();
                }
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            match Instant::now().checked_sub(Duration::from_secs(60)) {
                Some(cutoff) => guard.iter().filter(|&&t| t >= cutoff).count() as u64,
                None => guard.len() as u64,
            }
        } else {
            0
        }
    }
}

/// Poll and HTTP statistics shared between the poller and the handlers.
pub struct PollStats {
    pub poll_duration_seconds: Stat,
    pub channels: Stat,
    pub total_polls: AtomicU64,
    pub success_count: AtomicU64,

    // Failures by reason
    pub transport_failures: AtomicU64,
    pub parse_failures: AtomicU64,
    pub empty_failures: AtomicU64,
    pub config_failures: AtomicU64,

    // HTTP server
    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,

    pub start_time: Instant,
    pub last_poll_time: StdRwLock<Option<Instant>>,
    pub last_success_time: StdRwLock<Option<Instant>>,
}

impl Default for PollStats {
    fn default() -> Self {
        Self {
            poll_duration_seconds: Stat::default(),
            channels: Stat::default(),
            total_polls: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            empty_failures: AtomicU64::new(0),
            config_failures: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
            last_poll_time: StdRwLock::new(None),
            last_success_time: StdRwLock::new(None),
        }
    }
}

impl PollStats {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_success(&self, duration_seconds: f64, channels: usize) {
        self.total_polls.fetch_add(1, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.poll_duration_seconds.add_sample(duration_seconds);
        self.channels.add_sample(channels as f64);

        let now = Instant::now();
        if let Ok(mut guard) = self.last_poll_time.write() {
            *guard = Some(now);
        }
        if let Ok(mut guard) = self.last_success_time.write() {
            *guard = Some(now);
        }
    }

    pub fn record_failure(&self, duration_seconds: f64, error: &CollectorError) {
        self.total_polls.fetch_add(1, Ordering::Relaxed);
        self.poll_duration_seconds.add_sample(duration_seconds);

        let counter = match error {
            CollectorError::Config => &self.config_failures,
            CollectorError::Transport(_) => &self.transport_failures,
            CollectorError::Parse(_) => &self.parse_failures,
            CollectorError::EmptyData => &self.empty_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut guard) = self.last_poll_time.write() {
            *guard = Some(Instant::now());
        }
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.transport_failures.load(Ordering::Relaxed)
            + self.parse_failures.load(Ordering::Relaxed)
            + self.empty_failures.load(Ordering::Relaxed)
            + self.config_failures.load(Ordering::Relaxed)
    }

    pub fn get_success_rate(&self) -> f64 {
        let success = self.success_count.load(Ordering::Relaxed);
        let total = success + self.failure_count();
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Seconds since the last successful poll, if any.
    pub fn seconds_since_success(&self) -> Option<u64> {
        self.last_success_time
            .read()
            .ok()
            .and_then(|guard| guard.map(|t| t.elapsed().as_secs()))
    }

    pub fn render_table(&self) -> String {
        let (pd_cur, pd_avg, pd_max, pd_min, _) = self.poll_duration_seconds.snapshot();
        let (ch_cur, ch_avg, ch_max, ch_min, _) = self.channels.snapshot();
        let total = self.total_polls.load(Ordering::Relaxed);
        let success_rate = self.get_success_rate();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();
        writeln!(out, "POLL STATISTICS").ok();
        writeln!(out, "===============").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(out, "{}", "-".repeat(left_col + 4 * (col_w + 3))).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "poll_duration (s)",
            format!("{:.3}", pd_cur),
            format!("{:.3}", pd_avg),
            format!("{:.3}", pd_max),
            format!("{:.3}", pd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "downstream_channels",
            format!("{:.0}", ch_cur),
            format!("{:.1}", ch_avg),
            format!("{:.0}", ch_max),
            format!("{:.0}", ch_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "POLL OUTCOMES").ok();
        writeln!(out, "-------------").ok();
        let outcomes = [
            ("polls_total", total),
            ("polls_succeeded", self.success_count.load(Ordering::Relaxed)),
            ("transport_failures", self.transport_failures.load(Ordering::Relaxed)),
            ("parse_failures", self.parse_failures.load(Ordering::Relaxed)),
            ("empty_failures", self.empty_failures.load(Ordering::Relaxed)),
            ("config_failures", self.config_failures.load(Ordering::Relaxed)),
        ];
        for (label, value) in outcomes {
            writeln!(out, "{:left$} | {:>col$}", label, value, left = left_col, col = col_w).ok();
        }
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "success_rate (%)",
            format!("{:.1}", success_rate),
            left = left_col,
            col = col_w
        )
        .ok();

        let last_success = match self.seconds_since_success() {
            Some(secs) => format!("{secs}s ago"),
            None => "N/A".to_string(),
        };
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "last_success",
            last_success,
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "requests_last_minute",
            self.http_request_timestamps.count_last_minute(),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "metrics_endpoint_calls",
            self.metrics_endpoint_calls.load(Ordering::Relaxed),
            left = left_col,
            col = col_w
        )
        .ok();

        out
    }
}
