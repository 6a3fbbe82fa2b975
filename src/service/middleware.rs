//! Service middleware for request logging and metrics events.
//!
//! ## Metrics Emitted
//!
//! Metrics are structured `tracing` events under the `travel_service::metrics`
//! target, aggregated downstream from logs:
//!
//! - `request` - path, method, status, latency per request
//! - `store_operation` - operation name, latency, success
//! - `token_verification` - valid/invalid

use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Header carrying an upstream trace id.
pub const TRACE_ID_HEADER: &str = "x-request-id";

/// Request logging middleware that adds a trace id, timing, and a request metric.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency_ms);

    info!(
        target: "travel_service::metrics",
        metric_type = "request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency_ms,
        "request completed"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Replaces ObjectId hex segments with an `:id` placeholder.
fn normalize_path(path: &str) -> String {
    static OBJECT_ID: OnceLock<Option<regex_lite::Regex>> = OnceLock::new();

    match OBJECT_ID.get_or_init(|| regex_lite::Regex::new(r"\b[0-9a-fA-F]{24}\b").ok()) {
        Some(re) => re.replace_all(path, ":id").to_string(),
        None => path.to_string(),
    }
}

/// Record a store operation.
pub fn record_store_operation(operation: &str, latency_ms: u64, success: bool) {
    let status = if success { "success" } else { "error" };
    info!(
        target: "travel_service::metrics",
        metric_type = "store_operation",
        operation = operation,
        status = status,
        latency_ms = latency_ms,
        "store_operation_metric"
    );
}

/// Record a bearer token verification.
pub fn record_token_verification(valid: bool) {
    let result = if valid { "valid" } else { "invalid" };
    info!(
        target: "travel_service::metrics",
        metric_type = "token_verification",
        result = result,
        "token_verification_metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_object_id() {
        let path = "/api/v1/travels/64b7f1c2a1b2c3d4e5f60718";
        assert_eq!(normalize_path(path), "/api/v1/travels/:id");
    }

    #[test]
    fn test_normalize_path_preserves_regular_path() {
        assert_eq!(normalize_path("/api/v1/token/new"), "/api/v1/token/new");
        assert_eq!(normalize_path("/api/v1/travels/short"), "/api/v1/travels/short");
    }
}
