use crate::api::models::{HealthResponse, UpstreamHealth};
use crate::api::AppState;
use axum::{extract::State, response::Json};
use tracing::warn;

/// Always answers; a failing readings API only degrades the status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream = match state.source.total_rows().await {
        Ok(total_rows) => UpstreamHealth {
            reachable: true,
            total_rows: Some(total_rows),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "Readings API health check failed");
            UpstreamHealth {
                reachable: false,
                total_rows: None,
                error: Some(e.to_string()),
            }
        }
    };

    Json(HealthResponse {
        status: if upstream.reachable { "ok" } else { "degraded" },
        upstream,
    })
}
