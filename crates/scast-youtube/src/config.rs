//! Upload client configuration.

use crate::retry::RetryConfig;

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default resumable upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Default chunk size: 8 MiB.
pub const DEFAULT_CHUNK_BYTES: u64 = 8 * 1024 * 1024;

/// Chunk sizes must be a multiple of 256 KiB, except for the final chunk.
const CHUNK_GRANULE: u64 = 256 * 1024;

const MIN_CHUNK_BYTES: u64 = CHUNK_GRANULE;
const MAX_CHUNK_BYTES: u64 = 64 * 1024 * 1024;

/// Upload client configuration.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    /// OAuth2 token endpoint.
    pub token_url: String,
    /// Resumable upload endpoint.
    pub upload_url: String,
    /// Bytes transmitted per chunk update.
    pub chunk_bytes: u64,
    /// Timeout per network call (seconds).
    pub timeout_secs: u64,
    /// Connect timeout (seconds).
    pub connect_timeout_secs: u64,
    /// Retry policy for chunk transmission.
    pub retry: RetryConfig,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            timeout_secs: 300,
            connect_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl YoutubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let chunk_bytes: u64 = std::env::var("SCAST_YT_CHUNK_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CHUNK_BYTES);

        let timeout_secs: u64 = std::env::var("SCAST_YT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let connect_timeout_secs: u64 = std::env::var("SCAST_YT_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            token_url: std::env::var("SCAST_YT_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            upload_url: std::env::var("SCAST_YT_UPLOAD_URL")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string()),
            chunk_bytes: clamp_chunk_bytes(chunk_bytes),
            timeout_secs,
            connect_timeout_secs,
            retry: RetryConfig::from_env(),
        }
    }
}

/// Clamp a requested chunk size to the supported range and round it down
/// to the 256 KiB granule.
pub fn clamp_chunk_bytes(requested: u64) -> u64 {
    let clamped = requested.clamp(MIN_CHUNK_BYTES, MAX_CHUNK_BYTES);
    clamped - (clamped % CHUNK_GRANULE)
}

// =============================================================================
// Tests
// =============================================================================
