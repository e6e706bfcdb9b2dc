//! Health check endpoint handler.
//!
//! Returns 200 once the last poll succeeded and 503 otherwise, followed by a
//! plain-text table of poll statistics.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = concat!("arris-modem-exporter ", env!("CARGO_PKG_VERSION"));

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");
    state.poll_stats.record_http_request();

    let snapshot = state.snapshot();

    let status = if snapshot.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let message = match (&snapshot.polled_at, &snapshot.last_error) {
        (None, _) => "Waiting for first poll".to_string(),
        (Some(_), None) => "OK".to_string(),
        (Some(_), Some(e)) => format!("Last poll failed: {e}"),
    };

    let uptime_hours = state.poll_stats.get_uptime_seconds() as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let last_success = state
        .poll_stats
        .seconds_since_success()
        .map(|s| format!("{s}s ago"))
        .unwrap_or_else(|| "never".to_string());

    let table = state.poll_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nModem: {url}\nUptime: {uptime_str}\nLast success: {last_success}\n\n{table}\n{FOOTER_TEXT}",
            url = snapshot.url
        ),
    )
}
