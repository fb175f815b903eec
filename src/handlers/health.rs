use axum::{extract::State, http::header, response::IntoResponse};

use crate::app_state::AppState;

/// Liveness probe. Carries no auth and touches no dependency.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Prometheus text exposition of the process metrics
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
