//! Cross-cutting HTTP layers: request logging and response security headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Duration;
use tracing::Span;

/// Span for one request, carrying method and path.
///
/// Used with `TraceLayer::make_span_with` so every route is logged.
pub fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Log the outcome of a request inside its span.
pub fn log_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        "Request completed"
    );
}

/// Middleware that adds security headers to all responses.
///
/// - **Cache-Control: no-store**: pages vary by session cookie and must not
///   be cached by intermediaries.
/// - **X-Content-Type-Options: nosniff**
/// - **X-Frame-Options: DENY** and `frame-ancestors 'none'` against
///   clickjacking of the login form.
/// - **Referrer-Policy: same-origin**
/// - **Content-Security-Policy** restricting scripts, styles and form posts
///   to the same origin.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("cache-control", HeaderValue::from_static("no-store"));
    headers.insert("referrer-policy", HeaderValue::from_static("same-origin"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self'; \
             style-src 'self'; \
             object-src 'none'; \
             frame-ancestors 'none'; \
             base-uri 'self'; \
             form-action 'self'",
        ),
    );

    response
}
