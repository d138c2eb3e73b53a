//! Error types for Drive downloads.

use scast_models::DriveLinkError;
use thiserror::Error;

/// Result type for Drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Errors that can occur while fetching a source video from Drive.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Invalid Drive link: {0}")]
    InvalidLink(#[from] DriveLinkError),

    #[error("Download request failed with status {status}: {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error(
        "Drive returned an HTML page instead of file content; \
         the file may be private or too large for direct download"
    )]
    HtmlInterstitial,

    #[error("Downloaded file is empty")]
    EmptyDownload,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriveError {
    /// Create a request failure, truncating oversized bodies.
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        let mut detail: String = body.into();
        if detail.len() > 512 {
            let mut cut = 512;
            while !detail.is_char_boundary(cut) {
                cut -= 1;
            }
            detail.truncate(cut);
            detail.push_str("...");
        }
        Self::RequestFailed { status, detail }
    }

    /// Whether the link itself was rejected before any network I/O.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidLink(_))
    }
}
