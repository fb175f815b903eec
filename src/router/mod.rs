//! Router configuration module
//!
//! One relay route plus health and metrics probes, wrapped in the serving
//! stack: tracing, request logging, panic recovery, a global concurrency cap
//! and a timeout on the synchronous path. Paths are cleaned before routing.

use std::any::Any;

use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::{
    limit::GlobalConcurrencyLimitLayer,
    util::{MapRequest, MapRequestLayer},
    Layer, ServiceBuilder,
};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::error;

use crate::app_state::AppState;
use crate::config::{MAX_CONCURRENT_REQUESTS, REQUEST_TIMEOUT};
use crate::error::ApiError;
use crate::handlers::{health_check, prometheus_metrics, relay_change};
use crate::middleware::{
    add_no_cache_headers, json_content_type_middleware, metrics_middleware,
    request_logger::redact_path, request_logger_middleware,
};

/// The served application: the router behind the path-cleaning step.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Build the application served by `main`.
///
/// Path cleaning has to run before routing, so it wraps the router instead
/// of being added with `Router::layer`.
pub fn build_app(app_state: AppState) -> App {
    MapRequestLayer::new(clean_path as fn(Request) -> Request).layer(build_router(app_state))
}

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        .route("/{caller_key}/{*route_tail}", post(relay_change))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %redact_path(request.uri().path()),
                    )
                }))
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(metrics_middleware))
                .layer(from_fn(add_no_cache_headers))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(concurrency_limit_layer())
                .layer(timeout_layer())
                .layer(from_fn(json_content_type_middleware)),
        )
        .with_state(app_state)
}

/// Shared across every route, so the cap is process-wide. Excess requests wait.
fn concurrency_limit_layer() -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)
}

fn timeout_layer() -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, REQUEST_TIMEOUT)
}

/// Rewrites the request URI to its cleaned path, keeping the query.
fn clean_path(mut request: Request) -> Request {
    let cleaned = normalize_path(request.uri().path());
    if cleaned == request.uri().path() {
        return request;
    }

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", cleaned, query),
        None => cleaned,
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = match path_and_query.parse() {
        Ok(pq) => Some(pq),
        Err(_) => return request,
    };
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }

    request
}

/// Collapses repeated slashes, resolves `.` and `..` and drops a trailing slash.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Turns a handler panic into a 500 instead of tearing down the connection task.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "handler panicked");
    ApiError::Internal(detail).into_response()
}
