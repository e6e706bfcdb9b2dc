//! Configuration management for arris-modem-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use arris_modem_exporter::{CollectorError, DEFAULT_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;
pub const DEFAULT_UPDATE_EVERY: u64 = 10;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

fn default_url() -> Option<String> {
    Some(DEFAULT_URL.to_string())
}

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Modem polling
    /// Status page URL. An explicit `null` or empty string is rejected.
    #[serde(default = "default_url")]
    pub url: Option<String>,
    #[serde(alias = "update-every")]
    pub update_every: Option<u64>,
    #[serde(alias = "timeout")]
    pub timeout_seconds: Option<u64>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Logging
    pub log_level: Option<String>,

    /// Path to a saved status page (skips HTTP)
    #[serde(alias = "test-data-file")]
    pub test_data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            url: default_url(),
            update_every: Some(DEFAULT_UPDATE_EVERY),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            enable_health: Some(true),
            log_level: Some("info".into()),
            test_data_file: None,
        }
    }
}

impl Config {
    /// URL the collector polls; empty when unset.
    pub fn effective_url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.effective_url().is_empty() {
        return Err(CollectorError::Config.into());
    }

    if cfg.update_every == Some(0) {
        return Err("update_every must be at least 1 second".into());
    }

    if cfg.timeout_seconds == Some(0) {
        return Err("timeout_seconds must be at least 1 second".into());
    }

    if let Some(level) = &cfg.log_level {
        if LogLevel::from_name(level).is_none() {
            return Err(format!("Unknown log_level: {level}").into());
        }
    }

    if let Some(path) = &cfg.test_data_file {
        if !path.exists() {
            return Err(format!("Test data file not found: {}", path.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(url) = &args.url {
        config.url = Some(url.clone());
    }
    if let Some(update_every) = args.update_every {
        config.update_every = Some(update_every);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = Some(timeout);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    if let Some(test_file) = &args.test_data_file {
        config.test_data_file = Some(test_file.clone());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        let defaults = [
            "/etc/arris-modem-exporter/config.yaml",
            "/etc/arris-modem-exporter/config.yml",
            "/etc/arris-modem-exporter/config.json",
            "./arris-modem-exporter.yaml",
            "./arris-modem-exporter.yml",
            "./arris-modem-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.effective_url(), DEFAULT_URL);
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_missing_url_key_uses_default() {
        let cfg: Config = serde_yaml::from_str("port: 9300\n").unwrap();
        assert_eq!(cfg.effective_url(), DEFAULT_URL);
        assert_eq!(cfg.port, Some(9300));
    }

    #[test]
    fn test_null_url_is_rejected() {
        let cfg: Config = serde_yaml::from_str("url: null\n").unwrap();
        let err = validate_effective_config(&cfg).unwrap_err();
        assert_eq!(err.to_string(), "URL is not defined or type is not <str>");
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let cfg = Config {
            url: Some(String::new()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_whitespace_url_is_not_rejected() {
        let cfg = Config {
            url: Some(" ".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_non_string_url_fails_to_load() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "url: [1, 2]").unwrap();
        assert!(load_config(file.path().to_str()).is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let cfg = Config {
            update_every: Some(0),
            ..Config::default()
        };
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("update_every"));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let cfg = Config {
            log_level: Some("chatty".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_load_toml_config() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "url = \"http://10.1.1.1/cgi-bin/status_cgi\"").unwrap();
        writeln!(file, "update_every = 30").unwrap();

        let cfg = load_config(file.path().to_str()).unwrap();
        assert_eq!(cfg.effective_url(), "http://10.1.1.1/cgi-bin/status_cgi");
        assert_eq!(cfg.update_every, Some(30));
        assert_eq!(cfg.port, None);
    }

    #[test]
    fn test_render_config_round_trips_yaml() {
        let rendered = render_config(&Config::default(), ConfigFormat::Yaml).unwrap();
        let parsed: Config = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.effective_url(), DEFAULT_URL);
    }
}
