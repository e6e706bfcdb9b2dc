//! Prometheus metrics definitions for arris-modem-exporter.
//!
//! Every downstream chart becomes one `GaugeVec` labelled by channel. The
//! channel label is the chart line's display name (1-based), so the first
//! row of the status page is exported as `channel="1"`.

use arris_modem_exporter::modem::{ChartSeriesSet, FlatData, MetricField};
use arris_modem_exporter::CollectorError;
use prometheus::{Gauge, GaugeVec, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Collection of Prometheus metrics exported for the modem.
#[derive(Clone)]
pub struct ModemMetrics {
    // ========== Downstream Channel Metrics ==========
    pub downstream_frequency_mhz: GaugeVec, // labels: channel
    pub downstream_power_dbmv: GaugeVec,    // labels: channel
    pub downstream_snr_db: GaugeVec,        // labels: channel
    pub downstream_octets_total: GaugeVec,  // labels: channel
    pub downstream_corrected_errors_total: GaugeVec, // labels: channel
    pub downstream_uncorrected_errors_total: GaugeVec, // labels: channel

    // ========== Exporter Metrics ==========
    pub poll_duration_seconds: Gauge,
    pub poll_success: Gauge,
    pub downstream_channels: Gauge,
    pub polls_total: IntCounter,
    pub poll_failures_total: IntCounterVec, // labels: reason

    /// Channels carrying a value in the channel gauges.
    published_channels: Arc<AtomicUsize>,
}

impl ModemMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let channel_gauge =
            |name: &str, help: &str| GaugeVec::new(Opts::new(name, help), &["channel"]);

        let downstream_frequency_mhz = channel_gauge(
            "arris_downstream_frequency_mhz",
            "Downstream channel center frequency in MHz",
        )?;
        let downstream_power_dbmv = channel_gauge(
            "arris_downstream_power_dbmv",
            "Downstream channel receive power in dBmV",
        )?;
        let downstream_snr_db = channel_gauge(
            "arris_downstream_snr_db",
            "Downstream channel signal-to-noise ratio in dB",
        )?;
        let downstream_octets_total = channel_gauge(
            "arris_downstream_octets_total",
            "Octets received on the downstream channel as reported by the modem",
        )?;
        let downstream_corrected_errors_total = channel_gauge(
            "arris_downstream_corrected_errors_total",
            "Codewords with corrected errors on the downstream channel",
        )?;
        let downstream_uncorrected_errors_total = channel_gauge(
            "arris_downstream_uncorrected_errors_total",
            "Codewords with uncorrectable errors on the downstream channel",
        )?;

        let poll_duration_seconds = Gauge::new(
            "arris_exporter_poll_duration_seconds",
            "Time spent on the last status page poll",
        )?;
        let poll_success = Gauge::new(
            "arris_exporter_poll_success",
            "Whether the last poll was successful (1) or failed (0)",
        )?;
        let downstream_channels = Gauge::new(
            "arris_exporter_downstream_channels",
            "Number of downstream channels currently declared",
        )?;
        let polls_total = IntCounter::new(
            "arris_exporter_polls_total",
            "Total number of status page polls",
        )?;
        let poll_failures_total = IntCounterVec::new(
            Opts::new(
                "arris_exporter_poll_failures_total",
                "Failed status page polls by reason",
            ),
            &["reason"],
        )?;

        registry.register(Box::new(downstream_frequency_mhz.clone()))?;
        registry.register(Box::new(downstream_power_dbmv.clone()))?;
        registry.register(Box::new(downstream_snr_db.clone()))?;
        registry.register(Box::new(downstream_octets_total.clone()))?;
        registry.register(Box::new(downstream_corrected_errors_total.clone()))?;
        registry.register(Box::new(downstream_uncorrected_errors_total.clone()))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;
        registry.register(Box::new(poll_success.clone()))?;
        registry.register(Box::new(downstream_channels.clone()))?;
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_failures_total.clone()))?;

        Ok(Self {
            downstream_frequency_mhz,
            downstream_power_dbmv,
            downstream_snr_db,
            downstream_octets_total,
            downstream_corrected_errors_total,
            downstream_uncorrected_errors_total,
            poll_duration_seconds,
            poll_success,
            downstream_channels,
            polls_total,
            poll_failures_total,
            published_channels: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn channel_vec(&self, field: MetricField) -> &GaugeVec {
        match field {
            MetricField::Frequency => &self.downstream_frequency_mhz,
            MetricField::Power => &self.downstream_power_dbmv,
            MetricField::SignalToNoise => &self.downstream_snr_db,
            MetricField::Octets => &self.downstream_octets_total,
            MetricField::CorrectedErrors => &self.downstream_corrected_errors_total,
            MetricField::UncorrectedErrors => &self.downstream_uncorrected_errors_total,
        }
    }

    /// Resets all per-channel metrics so vanished channels are not exported.
    pub fn reset_channel_metrics(&self) {
        for field in MetricField::ALL {
            self.channel_vec(field).reset();
        }
        self.published_channels.store(0, Ordering::Relaxed);
    }

    /// Publishes a successful poll in display units.
    ///
    /// Existing series are overwritten in place so a concurrent scrape never
    /// sees a partially cleared vector. Only channels beyond the new channel
    /// count are removed.
    pub fn publish(&self, data: &FlatData, series: &ChartSeriesSet, duration_seconds: f64) {
        let channels = series.channel_count();

        for field in MetricField::ALL {
            let vec = self.channel_vec(field);
            for index in 0..channels {
                let Some(line) = series.series_for_row(field, index) else {
                    continue;
                };
                match data.get(&format!("downstream_{index}_{field}")) {
                    Some(value) => vec
                        .with_label_values(&[line.name.as_str()])
                        .set(line.scale(value.as_f64())),
                    None => {
                        let _ = vec.remove_label_values(&[line.name.as_str()]);
                    }
                }
            }
        }

        let previous = self.published_channels.swap(channels, Ordering::Relaxed);
        for channel in (channels + 1)..=previous {
            let label = channel.to_string();
            for field in MetricField::ALL {
                let _ = self.channel_vec(field).remove_label_values(&[label.as_str()]);
            }
        }

        self.polls_total.inc();
        self.poll_success.set(1.0);
        self.poll_duration_seconds.set(duration_seconds);
        self.downstream_channels.set(channels as f64);
    }

    /// Records a failed poll; channel metrics are cleared.
    pub fn publish_failure(&self, error: &CollectorError, duration_seconds: f64) {
        self.reset_channel_metrics();

        self.polls_total.inc();
        self.poll_failures_total
            .with_label_values(&[error.reason()])
            .inc();
        self.poll_success.set(0.0);
        self.poll_duration_seconds.set(duration_seconds);
    }
}
