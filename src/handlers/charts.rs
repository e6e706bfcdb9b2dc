//! Chart declaration endpoint handler.

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /charts endpoint. Charts carry no lines until the first
/// successful poll has discovered the channels.
#[instrument(skip(state))]
pub async fn charts_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /charts request");
    state.poll_stats.record_http_request();

    let declaration = state.snapshot().series.declaration();
    Json(declaration)
}
