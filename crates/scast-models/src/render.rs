//! Output render profile.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Portrait Shorts frame
pub const TARGET_WIDTH: u32 = 1080;
pub const TARGET_HEIGHT: u32 = 1920;

/// Frame rate and pixel format every segment is conformed to
pub const TARGET_FRAME_RATE: u32 = 30;
pub const TARGET_PIXEL_FORMAT: &str = "yuv420p";

/// Seconds of thumbnail lead-in spliced before the main video
pub const LEAD_IN_SECONDS: f64 = 1.0;

/// Encoding parameters for the assembled output.
///
/// Every segment is conformed to this profile before concatenation so the
/// splice is frame-compatible.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderProfile {
    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output frame rate
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Pixel format (e.g. "yuv420p")
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Video codec (e.g. "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g. "fast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Duration of the still-image lead-in segment, in seconds
    #[serde(default = "default_lead_in_seconds")]
    pub lead_in_seconds: f64,
}

fn default_width() -> u32 {
    TARGET_WIDTH
}
fn default_height() -> u32 {
    TARGET_HEIGHT
}
fn default_frame_rate() -> u32 {
    TARGET_FRAME_RATE
}
fn default_pixel_format() -> String {
    TARGET_PIXEL_FORMAT.to_string()
}
fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_lead_in_seconds() -> f64 {
    LEAD_IN_SECONDS
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            width: TARGET_WIDTH,
            height: TARGET_HEIGHT,
            frame_rate: TARGET_FRAME_RATE,
            pixel_format: TARGET_PIXEL_FORMAT.to_string(),
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            lead_in_seconds: LEAD_IN_SECONDS,
        }
    }
}

impl RenderProfile {
    /// The 9:16 portrait profile used for Shorts.
    pub fn portrait() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_portrait_shorts() {
        let profile = RenderProfile::default();
        assert_eq!(profile.width, 1080);
        assert_eq!(profile.height, 1920);
        assert_eq!(profile.frame_rate, 30);
        assert_eq!(profile.pixel_format, "yuv420p");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let profile: RenderProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.codec, DEFAULT_VIDEO_CODEC);
        assert_eq!(profile.crf, DEFAULT_CRF);
        assert_eq!(profile.lead_in_seconds, 1.0);
    }
}
