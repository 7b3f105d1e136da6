//! Metrics for Vision API requests.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "croploc_vision_requests_total";
    pub const REQUEST_DURATION_MS: &str = "croploc_vision_request_duration_ms";
    pub const RETRIES_TOTAL: &str = "croploc_vision_retries_total";
}

/// Record a Vision API request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    let labels = [
        ("operation", operation.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::REQUEST_DURATION_MS, &labels).record(latency_ms);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::RETRIES_TOTAL, &labels).increment(1);
}
