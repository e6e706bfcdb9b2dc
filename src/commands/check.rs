//! Check command implementation.
//!
//! Validates the configuration and runs a single poll against the modem.

use anyhow::Context;

use crate::config::{validate_effective_config, Config};
use crate::poller::build_collector;

/// Returns Ok(true) when the modem produced downstream data.
pub fn command_check(config: &Config) -> anyhow::Result<bool> {
    println!("🔍 Arris Modem Exporter - Check");
    println!("===============================");

    println!("\n⚙️  Checking configuration...");
    if let Err(e) = validate_effective_config(config) {
        println!("   ❌ {}", e);
        return Ok(false);
    }
    println!("   ✅ Configuration is valid");

    println!("\n📡 Polling {}...", config.effective_url());
    let mut collector = build_collector(config).context("Failed to create HTTP client")?;

    let ok = collector.check();
    if ok {
        let series = collector.series();
        println!("   ✅ Found {} downstream channels", series.channel_count());
        println!("   ✅ Declared {} series", series.series_ids().count());
    } else {
        println!("   ❌ No downstream data (see log for details)");
    }

    println!();
    if ok {
        println!("✅ All checks passed");
    } else {
        println!("❌ Check failed");
    }
    Ok(ok)
}
