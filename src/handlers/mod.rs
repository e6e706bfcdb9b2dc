//! HTTP endpoint handlers for the exporter.
//!
//! - `/`: landing page
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: poll health and statistics
//! - `/charts`: chart declarations for the discovered channels
//! - `/data`: latest flattened poll data
//! - `/config`: effective configuration

pub mod charts;
pub mod config;
pub mod data;
pub mod health;
pub mod metrics;
pub mod root;

// Re-export handlers
pub use charts::charts_handler;
pub use config::config_handler;
pub use data::data_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
