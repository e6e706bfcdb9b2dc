//! CLI arguments and subcommands for arris-modem-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parses a level name from the config file; unknown names yield None.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "arris-modem-exporter",
    about = "Prometheus exporter for Arris cable modem downstream channel statistics",
    long_about = "Prometheus exporter for Arris cable modem downstream channel statistics.\n\n\
                  Polls the modem status page on a fixed interval, extracts per-channel \
                  frequency, power, SNR, octet and error counters from the downstream table \
                  and publishes them as Prometheus metrics and chart declarations.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Modem status page URL
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Seconds between polls
    #[arg(long)]
    pub update_every: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Read the status page from this HTML file instead of the modem
    #[arg(short = 't', long)]
    pub test_data_file: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and run one poll against the modem
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Poll the modem and print the flattened data
    Test {
        /// Number of poll cycles
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Print every value, not just totals
        #[arg(long)]
        verbose: bool,
    },

    /// Poll the modem once and print the chart declarations
    Charts {
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::try_parse_from([
            "arris-modem-exporter",
            "--url",
            "http://10.0.0.1/status",
            "--update-every",
            "30",
            "--no-config",
        ])
        .unwrap();
        assert_eq!(args.url.as_deref(), Some("http://10.0.0.1/status"));
        assert_eq!(args.update_every, Some(30));
        assert!(args.no_config);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_log_level_names() {
        assert!(matches!(LogLevel::from_name("DEBUG"), Some(LogLevel::Debug)));
        assert!(LogLevel::from_name("verbose").is_none());
        assert_eq!(LogLevel::Warn.as_str(), "warn");
    }

    #[test]
    fn test_parse_test_subcommand() {
        let args = Args::try_parse_from(["arris-modem-exporter", "test", "-n", "3"]).unwrap();
        match args.command {
            Some(Commands::Test { iterations, verbose }) => {
                assert_eq!(iterations, 3);
                assert!(!verbose);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
