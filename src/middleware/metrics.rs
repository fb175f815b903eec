use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Metrics middleware that tracks request duration by status
///
/// Paths are deliberately not used as labels: they carry credentials.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Track caller key verification
pub fn track_auth_attempt(success: bool) {
    counter!("auth_attempts_total", "success" => success.to_string()).increment(1);
}

/// Track the terminal state of a relay request
pub fn track_relay_outcome(outcome: &'static str) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
}

/// Track detached Slack deliveries
pub fn track_dispatch(success: bool) {
    let outcome = if success { "delivered" } else { "failed" };
    counter!("relay_dispatch_total", "outcome" => outcome).increment(1);
}
