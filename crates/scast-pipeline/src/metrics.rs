//! Pipeline metrics collection.

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total publish jobs by outcome.
    pub const JOBS_TOTAL: &str = "scast_jobs_total";

    /// Whole-job duration in seconds by outcome.
    pub const JOB_SECONDS: &str = "scast_job_seconds";

    /// Per-stage duration in seconds.
    pub const STAGE_SECONDS: &str = "scast_stage_seconds";

    /// Total failed jobs by originating stage.
    pub const FAILURES_TOTAL: &str = "scast_job_failures_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a job reaching a terminal state.
pub fn record_job(outcome: &str, seconds: f64) {
    counter!(names::JOBS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::JOB_SECONDS, "outcome" => outcome.to_string()).record(seconds);
}

/// Record a completed pipeline stage.
pub fn record_stage(stage: &'static str, seconds: f64) {
    histogram!(names::STAGE_SECONDS, "stage" => stage).record(seconds);
}

/// Record a job failure attributed to its originating stage.
pub fn record_failure(stage: &'static str) {
    counter!(names::FAILURES_TOTAL, "stage" => stage).increment(1);
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
            names::JOBS_TOTAL,
            names::JOB_SECONDS,
            names::STAGE_SECONDS,
            names::FAILURES_TOTAL,
        ] {
            assert!(name.starts_with("scast_"));
        }
    }
}
