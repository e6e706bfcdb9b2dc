//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and written by the background poller thread.

use arris_modem_exporter::PollStats;
use prometheus::Registry;
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Instant;

use crate::cache::PollSnapshot;
use crate::config::Config;
use crate::metrics::ModemMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and the poller.
pub struct AppState {
    pub registry: Registry,
    pub metrics: ModemMetrics,
    pub snapshot: StdRwLock<PollSnapshot>,
    pub config: Arc<Config>,
    pub poll_stats: Arc<PollStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Registers all metrics and starts with an empty snapshot.
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();
        let metrics = ModemMetrics::new(&registry)?;
        let snapshot = PollSnapshot::new(config.effective_url());

        Ok(Self {
            registry,
            metrics,
            snapshot: StdRwLock::new(snapshot),
            config: Arc::new(config),
            poll_stats: Arc::new(PollStats::new()),
            start_time: Instant::now(),
        })
    }

    /// Copy of the latest snapshot.
    pub fn snapshot(&self) -> PollSnapshot {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
