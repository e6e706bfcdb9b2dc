//! The downstream collector: fetch, parse and flatten one poll cycle.

use std::collections::BTreeMap;

use tracing::{debug, error, instrument};

use crate::error::CollectorError;
use crate::fetch::Fetcher;
use crate::modem::extract::extract_downstream;
use crate::modem::sample::{DownstreamChannelSample, MetricValue, PollResult};
use crate::modem::series::ChartSeriesSet;

/// Flat `metric name -> value` mapping published per successful poll.
pub type FlatData = BTreeMap<String, MetricValue>;

/// Flattens samples into `downstream_<index>_<field>` keys, index 0-based.
pub fn flatten(samples: &[DownstreamChannelSample]) -> FlatData {
    samples
        .iter()
        .enumerate()
        .flat_map(|(index, sample)| {
            sample
                .values()
                .into_iter()
                .map(move |(field, value)| (format!("downstream_{index}_{field}"), value))
        })
        .collect()
}

/// Polls one modem status page.
///
/// Owns the chart lines discovered so far; they survive failed polls and are
/// regenerated whenever a successful poll reports a different channel count.
pub struct DownstreamCollector<F> {
    url: String,
    fetcher: F,
    series: ChartSeriesSet,
}

impl<F: Fetcher> DownstreamCollector<F> {
    pub fn new(url: impl Into<String>, fetcher: F) -> Self {
        Self {
            url: url.into(),
            fetcher,
            series: ChartSeriesSet::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn series(&self) -> &ChartSeriesSet {
        &self.series
    }

    /// Fails permanently when no URL is configured.
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.url.is_empty() {
            return Err(CollectorError::Config);
        }
        Ok(())
    }

    /// Fetches the status page and extracts every downstream row.
    pub fn get_downstream_rows(&self) -> Result<PollResult, CollectorError> {
        let raw = self.fetcher.fetch_raw(&self.url)?;
        Ok(extract_downstream(&raw)?)
    }

    /// Runs one poll cycle.
    #[instrument(skip(self), fields(url = %self.url))]
    pub fn poll(&mut self) -> Result<FlatData, CollectorError> {
        self.validate()?;

        let samples = self.get_downstream_rows()?;
        self.series.ensure_channel_count(samples.len());

        let data = flatten(&samples);
        if data.is_empty() {
            return Err(CollectorError::EmptyData);
        }

        debug!("Poll produced {} values", data.len());
        Ok(data)
    }

    /// Activation check: validates the configuration and runs a first poll.
    ///
    /// Never fails past this boundary; every problem is logged and reported
    /// as `false`.
    pub fn check(&mut self) -> bool {
        if let Err(e) = self.validate() {
            error!("{}", e);
            return false;
        }

        match self.poll() {
            Ok(_) => true,
            Err(CollectorError::EmptyData) => {
                error!("Poll returned no data. Url: {}", self.url);
                false
            }
            Err(e) => {
                error!("Poll failed. Url: {}. Error: {}", self.url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::modem::sample::MetricField;
    use std::cell::Cell;

    const PAGE: &str = "<h4>Downstream</h4><table>\
        <tr><td>Downstream 1</td><td>1</td><td>549.0 MHz</td><td>3.8 dBmV</td><td>41.2 dB</td>\
        <td>256QAM</td><td>1000</td><td>2</td><td>0</td></tr>\
        <tr><td>Downstream 2</td><td>2</td><td>555.0 MHz</td><td>3.5 dBmV</td><td>40.9 dB</td>\
        <td>256QAM</td><td>2000</td><td>5</td><td>1</td></tr></table>";

    struct StaticFetcher {
        body: &'static str,
        calls: Cell<usize>,
    }

    impl StaticFetcher {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for StaticFetcher {
        fn fetch_raw(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    #[test]
    fn test_flatten_uses_zero_based_index() {
        let samples = extract_downstream(PAGE.as_bytes()).unwrap();
        let data = flatten(&samples);

        assert_eq!(data.len(), 12);
        assert_eq!(data["downstream_0_frequency"], MetricValue::Float(54900.0));
        assert_eq!(data["downstream_0_power"], MetricValue::Float(380.0));
        assert_eq!(data["downstream_0_signal_to_noise"], MetricValue::Float(4120.0));
        assert_eq!(data["downstream_0_octets"], MetricValue::Integer(1000));
        assert_eq!(data["downstream_0_corrected_errors"], MetricValue::Integer(2));
        assert_eq!(data["downstream_0_uncorrected_errors"], MetricValue::Integer(0));
        assert_eq!(data["downstream_1_uncorrected_errors"], MetricValue::Integer(1));
        assert!(!data.contains_key("downstream_2_frequency"));
    }

    #[test]
    fn test_poll_declares_series_once() {
        let mut collector = DownstreamCollector::new("http://modem/", StaticFetcher::new(PAGE));

        let first = collector.poll().unwrap();
        assert_eq!(collector.series().channel_count(), 2);
        let second = collector.poll().unwrap();

        assert_eq!(first, second);
        assert_eq!(collector.fetcher.calls.get(), 2);
        let line = collector
            .series()
            .series_for_row(MetricField::Frequency, 0)
            .unwrap();
        assert_eq!(line.id, "downstream_1_frequency");
    }

    #[test]
    fn test_empty_page_is_empty_data() {
        let mut collector = DownstreamCollector::new("http://modem/", StaticFetcher::new("<html/>"));
        assert!(matches!(collector.poll(), Err(CollectorError::EmptyData)));
        assert!(!collector.series().is_declared());
        assert!(!collector.check());
    }

    #[test]
    fn test_empty_url_is_config_error_without_fetch() {
        let mut collector = DownstreamCollector::new("", StaticFetcher::new(PAGE));
        let err = collector.poll().unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(collector.fetcher.calls.get(), 0);
        assert!(!collector.check());
    }

    #[test]
    fn test_whitespace_url_is_passed_to_fetcher() {
        let mut collector = DownstreamCollector::new(" ", StaticFetcher::new(PAGE));
        assert!(collector.validate().is_ok());
        assert!(collector.check());
        assert_eq!(collector.fetcher.calls.get(), 1);
    }

    #[test]
    fn test_transport_failure_is_reported_not_raised() {
        let mut collector = DownstreamCollector::new("http://modem/", FailingFetcher);
        assert!(matches!(collector.poll(), Err(CollectorError::Transport(_))));
        assert!(!collector.check());
    }

    #[test]
    fn test_check_succeeds_on_valid_page() {
        let mut collector = DownstreamCollector::new("http://modem/", StaticFetcher::new(PAGE));
        assert!(collector.check());
        assert_eq!(collector.series().series_ids().count(), 12);
    }
}
