//! Upload error types.

use thiserror::Error;

/// Result type for upload operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Maximum length of a response body carried inside an error message.
const MAX_DETAIL_LEN: usize = 512;

/// Fallback delay when the server rate-limits without a Retry-After header.
const DEFAULT_RETRY_AFTER_MS: u64 = 1000;

/// Errors that can occur while publishing a video.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Token exchange failed or returned no usable access token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Session initiation did not yield a resumable session URL.
    #[error("Upload session initiation failed: {0}")]
    Session(String),

    /// A chunk exhausted its retry budget. The failed byte range is carried
    /// so the caller can resume from the last confirmed offset.
    #[error("Chunk upload failed for bytes {start}-{end}: {detail}")]
    ChunkUpload { start: u64, end: u64, detail: String },

    /// Every byte was accepted but the platform never confirmed creation.
    #[error("Upload incomplete: {0}")]
    IncompleteUpload(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl YoutubeError {
    pub fn auth(detail: impl Into<String>) -> Self {
        Self::Auth(truncate_detail(detail.into()))
    }

    pub fn session(detail: impl Into<String>) -> Self {
        Self::Session(truncate_detail(detail.into()))
    }

    pub fn chunk_upload(start: u64, end: u64, detail: impl Into<String>) -> Self {
        Self::ChunkUpload {
            start,
            end,
            detail: truncate_detail(detail.into()),
        }
    }

    pub fn incomplete_upload(detail: impl Into<String>) -> Self {
        Self::IncompleteUpload(truncate_detail(detail.into()))
    }

    pub fn request_failed(detail: impl Into<String>) -> Self {
        Self::RequestFailed(truncate_detail(detail.into()))
    }

    /// Map an HTTP error status to the matching variant.
    pub fn from_http_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited(DEFAULT_RETRY_AFTER_MS),
            500..=599 => Self::ServerError(status, truncate_detail(detail.into())),
            _ => Self::RequestFailed(truncate_detail(detail.into())),
        }
    }

    /// Check if error is retryable.
    ///
    /// Retryable: transport faults, throttling, server-side errors. A 4xx
    /// other than 429 means re-sending the same bytes cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            YoutubeError::Network(_) | YoutubeError::RateLimited(_) | YoutubeError::ServerError(..)
        )
    }

    /// Server-requested delay before the next attempt, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            YoutubeError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}

fn truncate_detail(detail: String) -> String {
    if detail.len() <= MAX_DETAIL_LEN {
        return detail;
    }
    let mut cut = MAX_DETAIL_LEN;
    while !detail.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... ({} bytes total)", &detail[..cut], detail.len())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_429_is_rate_limited() {
        let err = YoutubeError::from_http_status(429, "slow down");
        assert!(matches!(err, YoutubeError::RateLimited(_)));
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), Some(DEFAULT_RETRY_AFTER_MS));
    }

    #[test]
    fn test_from_http_status_5xx_is_server_error() {
        let err = YoutubeError::from_http_status(503, "backend unavailable");
        assert!(matches!(err, YoutubeError::ServerError(503, _)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_http_status_4xx_is_permanent() {
        let err = YoutubeError::from_http_status(404, "session expired");
        assert!(matches!(err, YoutubeError::RequestFailed(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_chunk_upload_carries_range() {
        let err = YoutubeError::chunk_upload(1024, 2047, "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("1024-2047"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let err = YoutubeError::session("x".repeat(4096));
        let msg = err.to_string();
        assert!(msg.len() < 700);
        assert!(msg.contains("4096 bytes total"));
    }
}
