//! Chart declarations for the downstream metrics.
//!
//! The chart schema itself is static: six charts, one per [`MetricField`].
//! Only the per-channel lines are discovered at runtime, once the number of
//! downstream channels on the status page is known.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::modem::sample::MetricField;

/// Chart family shared by all downstream charts.
pub const FAMILY: &str = "arris";

/// Base priority of the first chart; later charts follow in order.
pub const PRIORITY: u32 = 90000;

/// Divisor consumers apply to centi-unit series.
pub const CENTI_DIVISOR: i64 = 100;

/// Static description of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: &'static str,
    pub field: MetricField,
    pub title: &'static str,
    pub units: &'static str,
    pub context: &'static str,
    pub chart_type: &'static str,
}

/// All charts in display order.
pub const CHARTS: [ChartSpec; 6] = [
    ChartSpec {
        id: "downstream_frequency",
        field: MetricField::Frequency,
        title: "Frequency",
        units: "mHz",
        context: "arris.frequency",
        chart_type: "line",
    },
    ChartSpec {
        id: "downstream_power",
        field: MetricField::Power,
        title: "Power",
        units: "dBmV",
        context: "arris.power",
        chart_type: "line",
    },
    ChartSpec {
        id: "downstream_signal_to_noise",
        field: MetricField::SignalToNoise,
        title: "Signal to Noise",
        units: "dB",
        context: "arris.signal_to_noise",
        chart_type: "line",
    },
    ChartSpec {
        id: "downstream_octets",
        field: MetricField::Octets,
        title: "Octets Received",
        units: "octets",
        context: "arris.octets",
        chart_type: "line",
    },
    ChartSpec {
        id: "downstream_corrected_errors",
        field: MetricField::CorrectedErrors,
        title: "Corrected Errors",
        units: "correcteds",
        context: "arris.corrected_errors",
        chart_type: "line",
    },
    ChartSpec {
        id: "downstream_uncorrected_errors",
        field: MetricField::UncorrectedErrors,
        title: "Uncorrected Errors",
        units: "uncorrectables",
        context: "arris.uncorrected_errors",
        chart_type: "line",
    },
];

/// Chart for a metric field.
pub fn chart_spec(field: MetricField) -> &'static ChartSpec {
    // CHARTS holds exactly one entry per field, in MetricField::ALL order.
    &CHARTS[field as usize]
}

/// How a consumer interprets consecutive values of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Point-in-time reading.
    Absolute,
    /// Cumulative counter, consumers compute deltas.
    Incremental,
}

/// One line of a chart: the series of a single channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesDescriptor {
    pub id: String,
    pub name: String,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divisor: Option<i64>,
}

impl SeriesDescriptor {
    /// Converts a stored value into display units.
    pub fn scale(&self, value: f64) -> f64 {
        let multiplier = self.multiplier.unwrap_or(1) as f64;
        let divisor = self.divisor.unwrap_or(1) as f64;
        value * multiplier / divisor
    }
}

/// Series for `channel` (1-based) of `field`.
pub fn series_descriptor(field: MetricField, channel: usize) -> SeriesDescriptor {
    let (algorithm, multiplier, divisor) = if field.is_counter() {
        (Algorithm::Incremental, None, None)
    } else {
        (Algorithm::Absolute, Some(1), Some(CENTI_DIVISOR))
    };

    SeriesDescriptor {
        id: format!("downstream_{channel}_{field}"),
        name: channel.to_string(),
        algorithm,
        multiplier,
        divisor,
    }
}

/// Chart declaration as handed to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub units: &'static str,
    pub family: &'static str,
    pub context: &'static str,
    pub chart_type: &'static str,
    pub priority: u32,
    pub lines: Vec<SeriesDescriptor>,
}

/// Complete chart declaration: chart order plus every chart with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDeclaration {
    pub order: Vec<&'static str>,
    pub charts: Vec<ChartDefinition>,
}

/// Per-channel lines of every chart, sized to the discovered channel count.
#[derive(Debug, Clone, Default)]
pub struct ChartSeriesSet {
    channel_count: usize,
    lines: BTreeMap<MetricField, Vec<SeriesDescriptor>>,
}

impl ChartSeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Whether any channel has been discovered yet.
    pub fn is_declared(&self) -> bool {
        self.channel_count > 0
    }

    /// Replaces all lines with `channel_count` lines per chart.
    pub fn regenerate(&mut self, channel_count: usize) {
        self.lines = MetricField::ALL
            .into_iter()
            .map(|field| {
                let lines = (1..=channel_count)
                    .map(|channel| series_descriptor(field, channel))
                    .collect();
                (field, lines)
            })
            .collect();
        self.channel_count = channel_count;
    }

    /// Regenerates the lines when a non-zero `observed` count differs from
    /// the declared one. Returns true if the set changed.
    pub fn ensure_channel_count(&mut self, observed: usize) -> bool {
        if observed == 0 || observed == self.channel_count {
            return false;
        }

        if self.is_declared() {
            info!(
                "Downstream channel count changed from {} to {}, regenerating chart lines",
                self.channel_count, observed
            );
        } else {
            info!("Discovered {} downstream channels", observed);
        }
        self.regenerate(observed);
        true
    }

    /// Lines of one chart.
    pub fn lines(&self, field: MetricField) -> &[SeriesDescriptor] {
        self.lines.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Line for the channel at 0-based row position `index`.
    pub fn series_for_row(&self, field: MetricField, index: usize) -> Option<&SeriesDescriptor> {
        self.lines(field).get(index)
    }

    /// Identifiers of every line across all charts.
    pub fn series_ids(&self) -> impl Iterator<Item = &str> {
        self.lines.values().flatten().map(|line| line.id.as_str())
    }

    /// Full chart declarations in display order.
    pub fn charts(&self) -> Vec<ChartDefinition> {
        CHARTS
            .iter()
            .enumerate()
            .map(|(position, spec)| ChartDefinition {
                id: spec.id,
                title: spec.title,
                units: spec.units,
                family: FAMILY,
                context: spec.context,
                chart_type: spec.chart_type,
                priority: PRIORITY + position as u32,
                lines: self.lines(spec.field).to_vec(),
            })
            .collect()
    }

    /// Chart order and definitions as one document.
    pub fn declaration(&self) -> ChartDeclaration {
        ChartDeclaration {
            order: CHARTS.iter().map(|spec| spec.id).collect(),
            charts: self.charts(),
        }
    }
}
