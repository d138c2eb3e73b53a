//! Wire types for the publish endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result object returned for every publish request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub success: bool,
    pub message: String,
    /// Identifier assigned by the platform on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Originating stage's diagnostic detail on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResponse {
    /// Successful publish with the platform-assigned video id.
    pub fn published(video_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Video uploaded to YouTube".to_string(),
            video_id: Some(video_id.into()),
            error: None,
        }
    }

    /// Failed publish with a user-facing message and diagnostic detail.
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            video_id: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(PublishResponse::published("abc123")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["videoId"], "abc123");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let json =
            serde_json::to_value(PublishResponse::failure("Processing failed", "boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("videoId").is_none());
    }
}
