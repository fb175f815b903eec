use crate::error::ApiError;
use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Middleware that rejects request bodies not declared as `application/json`.
///
/// Bodiless requests (GET, HEAD, or an explicit `Content-Length: 0`) pass through.
pub async fn json_content_type_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::GET
        || request.method() == Method::HEAD
        || has_empty_body(&request)
    {
        return next.run(request).await;
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("");

    if is_json_media_type(content_type) {
        next.run(request).await
    } else {
        ApiError::UnsupportedMediaType(content_type.to_string()).into_response()
    }
}

fn has_empty_body(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

/// Compares the media type only, ignoring parameters such as `charset`.
fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
