//! Fixed-interval poll scheduling.
//!
//! The collector lives on one dedicated thread and runs one cycle at a time.
//! Each cycle publishes into the Prometheus registry and the shared snapshot;
//! a failed cycle is logged and the next one starts on schedule.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arris_modem_exporter::{DownstreamCollector, Fetcher, FileFetcher, HttpFetcher, TransportError};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, DEFAULT_TIMEOUT_SECONDS};
use crate::state::{AppState, SharedState};

/// Collector type used by the binary.
pub type BoxedCollector = DownstreamCollector<Box<dyn Fetcher>>;

/// Builds the collector for the effective configuration.
///
/// Must run outside of the async runtime: the HTTP fetcher owns a blocking client.
pub fn build_collector(config: &Config) -> Result<BoxedCollector, TransportError> {
    let fetcher: Box<dyn Fetcher> = match &config.test_data_file {
        Some(path) => {
            info!("Using status page from file: {}", path.display());
            Box::new(FileFetcher::new(path))
        }
        None => {
            let timeout = config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
            Box::new(HttpFetcher::new(Duration::from_secs(timeout))?)
        }
    };

    Ok(DownstreamCollector::new(config.effective_url(), fetcher))
}

/// Runs one poll cycle and publishes its outcome. Returns true on success.
#[instrument(skip_all, fields(url = %collector.url()))]
pub fn run_cycle<F: Fetcher>(state: &AppState, collector: &mut DownstreamCollector<F>) -> bool {
    let start = Instant::now();
    let result = collector.poll();
    let duration = start.elapsed().as_secs_f64();

    match result {
        Ok(data) => {
            let series = collector.series();
            info!(
                "Poll succeeded: {} channels, {} values in {:.3}s",
                series.channel_count(),
                data.len(),
                duration
            );

            state.metrics.publish(&data, series, duration);
            state
                .poll_stats
                .record_success(duration, series.channel_count());
            if let Ok(mut snapshot) = state.snapshot.write() {
                snapshot.record_success(data, series, duration);
            }
            true
        }
        Err(e) => {
            if e.is_permanent() {
                error!("Poll cannot succeed. Url: {:?}. Error: {}", collector.url(), e);
            } else {
                warn!("Poll failed. Url: {}. Error: {}", collector.url(), e);
            }

            state.metrics.publish_failure(&e, duration);
            state.poll_stats.record_failure(duration, &e);
            if let Ok(mut snapshot) = state.snapshot.write() {
                snapshot.record_failure(&e, duration);
            }
            false
        }
    }
}

/// Starts the poller thread. Dropping the shutdown sender stops it after the
/// current cycle.
pub fn spawn_poller<F: Fetcher + 'static>(
    state: SharedState,
    mut collector: DownstreamCollector<F>,
    interval: Duration,
    shutdown: Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("modem-poller".into())
        .spawn(move || {
            info!(
                "Poller started: {} every {}s",
                collector.url(),
                interval.as_secs()
            );

            loop {
                let started = Instant::now();
                run_cycle(&state, &mut collector);

                let wait = interval.saturating_sub(started.elapsed());
                debug!("Next poll in {:.1}s", wait.as_secs_f64());
                match shutdown.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            info!("Poller stopped");
        })
}
