//! Request logging, response security headers and CORS handling.

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Security headers middleware
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    response
}

/// Access log line per request; server errors are raised to `warn`.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_us = started.elapsed().as_micros() as u64;
    if status.is_server_error() {
        warn!(%method, %uri, status = status.as_u16(), latency_us, "request failed");
    } else {
        info!(%method, %uri, status = status.as_u16(), latency_us, "request");
    }

    response
}

/// Read-only API: when enabled, any origin may issue GET requests.
pub fn create_cors_layer(enable_cors: bool) -> CorsLayer {
    if enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers([axum::http::header::ACCEPT])
    } else {
        CorsLayer::new()
    }
}
