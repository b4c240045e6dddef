use std::sync::Arc;

use axum::{extract::State, Json};
use jpg2avif_core::models::HealthResponse;

use crate::state::AppState;

/// Liveness plus a memory snapshot of the process. Always 200; no conversion work.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let memory = state.resources.memory_usage();

    if memory.percent > state.config.server.health_memory_warn_percent {
        tracing::warn!(
            memory_percent = memory.percent,
            rss_mb = memory.rss_mb,
            threshold_percent = state.config.server.health_memory_warn_percent,
            "High memory usage"
        );
    }

    Json(HealthResponse::healthy(
        state.config.server.service_name.clone(),
        memory,
    ))
}
