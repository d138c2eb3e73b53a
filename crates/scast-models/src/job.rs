//! Publish job definitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::OauthCredentials;

/// Unique identifier for a publish job.
///
/// Also used as the job's staging-directory name, so concurrent jobs never
/// collide on artifact paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the main video comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// A Google Drive share link to resolve and stream down.
    Remote(String),
    /// Raw bytes uploaded with the request.
    Inline(Vec<u8>),
}

impl fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            VideoSource::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
        }
    }
}

/// Where the thumbnail comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Raw bytes uploaded with the request (image or short video).
    Inline(Vec<u8>),
    /// A Google Drive share link.
    Remote(String),
}

impl fmt::Debug for ThumbnailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailSource::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
            ThumbnailSource::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
        }
    }
}

/// One publish request: assemble thumbnail + video, schedule it on the
/// channel. Created per incoming request and never persisted.
#[derive(Debug, Clone)]
pub struct PublishJob {
    pub id: JobId,
    pub source: VideoSource,
    pub thumbnail: ThumbnailSource,
    pub title: String,
    pub description: String,
    /// When the platform should flip the video public.
    pub publish_at: DateTime<Utc>,
    pub credentials: OauthCredentials,
}

impl PublishJob {
    /// Required text fields are present and non-empty.
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.credentials.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> OauthCredentials {
        OauthCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "token".to_string(),
        }
    }

    #[test]
    fn test_job_id_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_job_id_display_round_trip() {
        let id = JobId::from_string("job-123");
        assert_eq!(id.to_string(), "job-123");
        assert_eq!(id.as_str(), "job-123");
    }

    #[test]
    fn test_required_fields() {
        let job = PublishJob {
            id: JobId::new(),
            source: VideoSource::Remote("https://drive.google.com/d/x".to_string()),
            thumbnail: ThumbnailSource::Inline(vec![1, 2, 3]),
            title: "A title".to_string(),
            description: "A description".to_string(),
            publish_at: Utc::now(),
            credentials: creds(),
        };
        assert!(job.has_required_fields());

        let blank_title = PublishJob {
            title: "   ".to_string(),
            ..job
        };
        assert!(!blank_title.has_required_fields());
    }

    #[test]
    fn test_inline_source_debug_omits_bytes() {
        let source = VideoSource::Inline(vec![0u8; 4096]);
        assert_eq!(format!("{:?}", source), "Inline(4096 bytes)");
    }
}
