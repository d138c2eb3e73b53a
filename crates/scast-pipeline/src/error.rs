//! Pipeline error types.

use thiserror::Error;

use scast_drive::DriveError;
use scast_models::DriveLinkError;
use scast_youtube::YoutubeError;

pub type PublishResult<T> = Result<T, PublishError>;

/// Errors a publish job can terminate with.
///
/// Each variant maps to the stage that produced it; the job aborts on the
/// first failure and the workspace is released regardless.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Required fields missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The source reference carries no recognizable file id.
    #[error("Invalid source reference: {0}")]
    InvalidReference(#[from] DriveLinkError),

    #[error("Source fetch failed: {0}")]
    Fetch(#[source] DriveError),

    #[error("Thumbnail normalization failed: {0}")]
    Normalization(#[source] scast_media::MediaError),

    #[error("Assembly failed: {0}")]
    Assembly(#[source] scast_media::MediaError),

    #[error("Upload failed: {0}")]
    Upload(#[from] YoutubeError),

    #[error("Workspace I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Pipeline stage the error originated in, for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            PublishError::Validation(_) | PublishError::InvalidReference(_) => "validate",
            PublishError::Fetch(_) => "fetch",
            PublishError::Normalization(_) => "normalize",
            PublishError::Assembly(_) => "assemble",
            PublishError::Upload(_) => "upload",
            PublishError::Io(_) => "workspace",
        }
    }

    /// True when the failure is the caller's input rather than a backend
    /// fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PublishError::Validation(_) | PublishError::InvalidReference(_)
        )
    }
}

// A failed fetch with an invalid link is a reference problem, not a
// transfer problem.
impl From<DriveError> for PublishError {
    fn from(e: DriveError) -> Self {
        match e {
            DriveError::InvalidLink(link) => Self::InvalidReference(link),
            other => Self::Fetch(other),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
