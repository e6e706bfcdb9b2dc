//! Latest poll data endpoint handler.

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /data endpoint.
#[instrument(skip(state))]
pub async fn data_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /data request");
    state.poll_stats.record_http_request();

    Json(state.snapshot())
}
