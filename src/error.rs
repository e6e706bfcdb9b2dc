//! Error types for the downstream collector.
//!
//! Every failure of a poll cycle maps onto one [`CollectorError`] variant. Only
//! [`CollectorError::Config`] is permanent; everything else ends the current
//! cycle and the next scheduled cycle starts from scratch.

use thiserror::Error;

/// Failure to obtain the raw status page.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read status page from {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a status page into channel samples.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Status page is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("Row {row}: missing cell {column}")]
    MissingCell { row: usize, column: usize },

    #[error("Row {row}: cell {column} has no text")]
    MissingText { row: usize, column: usize },

    #[error("Row {row}: cell {column} is not a number: {text:?}")]
    InvalidNumber {
        row: usize,
        column: usize,
        text: String,
    },
}

/// Outcome of a failed check or poll cycle.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("URL is not defined or type is not <str>")]
    Config,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Status page returned no downstream channel data")]
    EmptyData,
}

impl CollectorError {
    /// Short reason label used for failure accounting.
    pub fn reason(&self) -> &'static str {
        match self {
            CollectorError::Config => "config",
            CollectorError::Transport(_) => "transport",
            CollectorError::Parse(_) => "parse",
            CollectorError::EmptyData => "empty",
        }
    }

    /// Whether the collector can never succeed with its current configuration.
    pub fn is_permanent(&self) -> bool {
        matches!(self, CollectorError::Config)
    }
}
