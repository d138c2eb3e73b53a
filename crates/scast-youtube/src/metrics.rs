//! Upload metrics collection.

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total upload protocol requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "scast_upload_requests_total";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "scast_upload_retries_total";

    /// Total chunks acknowledged by the server.
    pub const CHUNKS_TOTAL: &str = "scast_upload_chunks_total";

    /// Total bytes acknowledged by the server.
    pub const BYTES_TOTAL: &str = "scast_upload_bytes_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "scast_upload_latency_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a completed protocol request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a server-acknowledged chunk.
pub fn record_chunk(bytes: u64) {
    counter!(names::CHUNKS_TOTAL).increment(1);
    counter!(names::BYTES_TOTAL).increment(bytes);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_share_prefix() {
        for name in [
            names::REQUESTS_TOTAL,
            names::RETRIES_TOTAL,
            names::CHUNKS_TOTAL,
            names::BYTES_TOTAL,
            names::LATENCY_SECONDS,
        ] {
            assert!(name.starts_with("scast_upload_"));
        }
    }
}
