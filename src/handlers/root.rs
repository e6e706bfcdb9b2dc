//! Landing page: modem, discovered channels, last poll and the endpoint list.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

const ENDPOINTS: [(&str, &str); 5] = [
    ("/metrics", "Prometheus metrics"),
    ("/health", "poll health and statistics"),
    ("/charts", "chart declarations (json)"),
    ("/data", "latest poll data (json)"),
    ("/config", "effective configuration"),
];

#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.poll_stats.record_http_request();

    let snapshot = state.snapshot();
    let last_poll = match snapshot.polled_at {
        None => "pending".to_string(),
        Some(at) => format!(
            "{} at {}",
            if snapshot.success { "ok" } else { "failed" },
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    };

    let endpoints: String = ENDPOINTS
        .iter()
        .filter(|(path, _)| *path != "/health" || state.config.enable_health.unwrap_or(true))
        .map(|(path, what)| format!("<li><a href=\"{path}\">{path}</a> {what}</li>\n"))
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Arris Modem Exporter</title>
<style>body {{ font-family: monospace; margin: 2em; }} td {{ padding-right: 2em; }}</style>
</head>
<body>
<h1>Arris Modem Exporter</h1>
<table>
<tr><td>Modem</td><td>{url}</td></tr>
<tr><td>Downstream channels</td><td>{channels}</td></tr>
<tr><td>Last poll</td><td>{last_poll}</td></tr>
</table>
<ul>
{endpoints}</ul>
<p>{FOOTER_TEXT}</p>
</body>
</html>"#,
        url = html_escape(&snapshot.url),
        channels = snapshot.channel_count,
    ))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
