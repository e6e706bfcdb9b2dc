//! Raw status page retrieval.
//!
//! The collector only needs the bytes of the status page. [`Fetcher`] is the
//! seam between the collector and however those bytes are obtained: over HTTP
//! from the modem, or from a saved page on disk for offline testing.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

/// Default location of the Arris status page.
pub const DEFAULT_URL: &str = "http://192.168.100.1/cgi-bin/status_cgi";

/// Source of raw status page bytes.
pub trait Fetcher: Send {
    fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        (**self).fetch_raw(url)
    }
}

/// Blocking HTTP fetcher.
///
/// The client must be created and dropped outside of an async runtime.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("arris-modem-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| TransportError::Request {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!("Fetching status page from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

/// Reads a saved status page from disk, ignoring the URL.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetcher for FileFetcher {
    fn fetch_raw(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
        debug!("Reading status page from {}", self.path.display());
        std::fs::read(&self.path).map_err(|source| TransportError::File {
            path: self.path.display().to_string(),
            source,
        })
    }
}
