//! Pipeline configuration.

use scast_models::RenderProfile;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for per-job workspaces.
    pub work_dir: String,
    /// Encoding profile for normalization and assembly.
    pub render: RenderProfile,
    /// Timeout for a single transcode subprocess (seconds).
    pub ffmpeg_timeout_secs: u64,
    /// Content type declared for the assembled artifact at upload.
    pub upload_content_type: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/shortcast".to_string(),
            render: RenderProfile::default(),
            ffmpeg_timeout_secs: 600,
            upload_content_type: "video/mp4".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("SCAST_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/shortcast".to_string()),
            render: RenderProfile::default(),
            ffmpeg_timeout_secs: std::env::var("SCAST_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
            upload_content_type: "video/mp4".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.work_dir, "/tmp/shortcast");
        assert_eq!(config.ffmpeg_timeout_secs, 600);
        assert_eq!(config.upload_content_type, "video/mp4");
        assert_eq!(config.render.width, 1080);
    }
}
