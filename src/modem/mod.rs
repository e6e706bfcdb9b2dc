//! Arris modem downstream collector.
//!
//! - `extract`: status page HTML to channel samples
//! - `series`: static chart schema and discovered per-channel lines
//! - `collector`: the poll cycle tying fetch, extraction and flattening together

pub mod collector;
pub mod extract;
pub mod sample;
pub mod series;

pub use collector::{flatten, DownstreamCollector, FlatData};
pub use extract::extract_downstream;
pub use sample::{DownstreamChannelSample, MetricField, MetricValue, PollResult};
pub use series::{
    chart_spec, series_descriptor, Algorithm, ChartDeclaration, ChartDefinition, ChartSeriesSet,
    ChartSpec, SeriesDescriptor, CHARTS,
};
