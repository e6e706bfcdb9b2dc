//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the effective exporter configuration.

use axum::{extract::State, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{
    DEFAULT_BIND_ADDR, DEFAULT_PORT, DEFAULT_TIMEOUT_SECONDS, DEFAULT_UPDATE_EVERY,
};
use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");
    state.poll_stats.record_http_request();

    let cfg = &state.config;
    let mut out = String::new();

    writeln!(out, "ARRIS MODEM EXPORTER - CONFIGURATION").ok();
    writeln!(out, "====================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(
        out,
        "bind:                 {}",
        cfg.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    )
    .ok();
    writeln!(out, "port:                 {}", cfg.port.unwrap_or(DEFAULT_PORT)).ok();
    writeln!(
        out,
        "enable_health:        {}",
        cfg.enable_health.unwrap_or(true)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "MODEM POLLING").ok();
    writeln!(out, "-------------").ok();
    writeln!(out, "url:                  {}", cfg.effective_url()).ok();
    writeln!(
        out,
        "update_every:         {} seconds",
        cfg.update_every.unwrap_or(DEFAULT_UPDATE_EVERY)
    )
    .ok();
    writeln!(
        out,
        "timeout_seconds:      {} seconds",
        cfg.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    )
    .ok();
    writeln!(
        out,
        "test_data_file:       {}",
        cfg.test_data_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "LOGGING").ok();
    writeln!(out, "-------").ok();
    writeln!(
        out,
        "log_level:            {}",
        cfg.log_level.as_deref().unwrap_or("info")
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    ([("Content-Type", "text/plain; charset=utf-8")], out)
}
