//! Arris Modem Exporter Library
//!
//! Scrapes the downstream channel table from an Arris cable modem status
//! page and turns it into a flat set of per-channel data points plus chart
//! declarations that follow the discovered channel count.
//!
//! # Usage
//!
//! ```no_run
//! use arris_modem_exporter::fetch::{HttpFetcher, DEFAULT_URL};
//! use arris_modem_exporter::modem::DownstreamCollector;
//! use std::time::Duration;
//!
//! let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
//! let mut collector = DownstreamCollector::new(DEFAULT_URL, fetcher);
//!
//! match collector.poll() {
//!     Ok(data) => {
//!         for (name, value) in &data {
//!             println!("{name} = {value}");
//!         }
//!     }
//!     Err(e) => eprintln!("poll failed: {e}"),
//! }
//!
//! for chart in collector.series().charts() {
//!     println!("{}: {} lines", chart.id, chart.lines.len());
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod modem;
pub mod poll_stats;

// Re-export main types for convenience
pub use error::{CollectorError, ParseError, TransportError};
pub use fetch::{FileFetcher, Fetcher, HttpFetcher, DEFAULT_URL};
pub use modem::{ChartSeriesSet, DownstreamChannelSample, DownstreamCollector, FlatData};
pub use poll_stats::PollStats;
