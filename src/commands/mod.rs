//! CLI command implementations for arris-modem-exporter.
//!
//! - `check`: validate configuration and poll the modem once
//! - `config`: configuration file generation
//! - `test`: run poll cycles and print the collected values
//! - `charts`: print the chart declarations for the discovered channels

pub mod charts;
pub mod check;
pub mod config;

// Re-export command functions
pub use charts::command_charts;
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
