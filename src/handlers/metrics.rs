//! `/metrics`: encodes the registry in Prometheus text format.
//!
//! The poller thread keeps the registry current, so a scrape never reaches
//! the modem.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};
use tracing::{error, instrument, trace};

use crate::state::SharedState;

#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Response {
    state.poll_stats.record_http_request();
    state.poll_stats.record_metrics_endpoint_call();

    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&state.registry.gather()) {
        Ok(body) => {
            trace!("Encoded {} bytes of metrics", body.len());
            (
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode Prometheus metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
