//! Charts command implementation.
//!
//! Polls the modem once so the channel count is known, then prints the
//! chart declarations.

use anyhow::Context;

use crate::cli::ConfigFormat;
use crate::config::Config;
use crate::poller::build_collector;

/// Prints the chart declarations in the requested format.
pub fn command_charts(format: ConfigFormat, config: &Config) -> anyhow::Result<()> {
    let mut collector = build_collector(config).context("Failed to create HTTP client")?;

    collector
        .poll()
        .with_context(|| format!("Failed to poll {}", config.effective_url()))?;

    let declaration = collector.series().declaration();
    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&declaration)?,
        ConfigFormat::Toml => toml::to_string_pretty(&declaration)?,
        ConfigFormat::Yaml => serde_yaml::to_string(&declaration)?,
    };

    println!("{}", content);
    Ok(())
}
