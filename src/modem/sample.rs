//! Parsed downstream channel rows and their metric fields.

use serde::Serialize;
use std::fmt;

/// Scale applied to frequency, power and SNR before storage.
pub const CENTI_SCALE: f64 = 100.0;

/// One downstream channel row of the status page.
///
/// Frequency, power and signal-to-noise are stored as centi-units (source
/// value x100). Counters are copied verbatim, sign included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownstreamChannelSample {
    pub frequency: f64,
    pub power: f64,
    pub signal_to_noise: f64,
    pub octets: i64,
    pub corrected_errors: i64,
    pub uncorrected_errors: i64,
}

impl DownstreamChannelSample {
    /// All six values in chart order.
    pub fn values(&self) -> [(MetricField, MetricValue); 6] {
        [
            (MetricField::Frequency, MetricValue::Float(self.frequency)),
            (MetricField::Power, MetricValue::Float(self.power)),
            (
                MetricField::SignalToNoise,
                MetricValue::Float(self.signal_to_noise),
            ),
            (MetricField::Octets, MetricValue::Integer(self.octets)),
            (
                MetricField::CorrectedErrors,
                MetricValue::Integer(self.corrected_errors),
            ),
            (
                MetricField::UncorrectedErrors,
                MetricValue::Integer(self.uncorrected_errors),
            ),
        ]
    }
}

/// Samples of one poll, index position = channel.
pub type PollResult = Vec<DownstreamChannelSample>;

/// The six per-channel metric categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Frequency,
    Power,
    SignalToNoise,
    Octets,
    CorrectedErrors,
    UncorrectedErrors,
}

impl MetricField {
    pub const ALL: [MetricField; 6] = [
        MetricField::Frequency,
        MetricField::Power,
        MetricField::SignalToNoise,
        MetricField::Octets,
        MetricField::CorrectedErrors,
        MetricField::UncorrectedErrors,
    ];

    /// Field name as used in metric and series identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricField::Frequency => "frequency",
            MetricField::Power => "power",
            MetricField::SignalToNoise => "signal_to_noise",
            MetricField::Octets => "octets",
            MetricField::CorrectedErrors => "corrected_errors",
            MetricField::UncorrectedErrors => "uncorrected_errors",
        }
    }

    /// Counters are cumulative; everything else is a point-in-time reading.
    pub fn is_counter(self) -> bool {
        matches!(
            self,
            MetricField::Octets | MetricField::CorrectedErrors | MetricField::UncorrectedErrors
        )
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Float(f64),
    Integer(i64),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Float(v) => v,
            MetricValue::Integer(v) => v as f64,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Float(v) => write!(f, "{v:.1}"),
            MetricValue::Integer(v) => write!(f, "{v}"),
        }
    }
}
