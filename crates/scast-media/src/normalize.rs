//! Thumbnail normalization.
//!
//! Converts an arbitrary thumbnail input (still image or short video) into
//! a lead-in segment matching the render profile: cover-fit to the target
//! frame, fixed frame rate and pixel format. A still image becomes a
//! one-second clip; a video keeps its own duration.

use std::path::Path;
use tracing::info;

use scast_models::RenderProfile;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::filter_conform;
use crate::probe::probe_media;

/// What the normalizer found the input to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailKind {
    StillImage,
    Video,
}

/// Normalize a thumbnail into a lead-in segment at `output`.
///
/// Always writes a new artifact; the input is never modified.
pub async fn normalize_thumbnail(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &RenderProfile,
    timeout_secs: u64,
) -> MediaResult<ThumbnailKind> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    if input == output {
        return Err(MediaError::internal(
            "thumbnail normalization must not write over its input",
        ));
    }

    let info = probe_media(input).await?;
    let kind = if info.is_still_image() {
        ThumbnailKind::StillImage
    } else {
        ThumbnailKind::Video
    };

    info!(
        input = %input.display(),
        codec = %info.codec,
        width = info.width,
        height = info.height,
        still = matches!(kind, ThumbnailKind::StillImage),
        "Normalizing thumbnail"
    );

    let conform = filter_conform(profile.width, profile.height, profile.frame_rate);

    let cmd = match kind {
        ThumbnailKind::StillImage => {
            // Loop the single frame into a short clip
            FfmpegCommand::new(output)
                .input_arg("-loop")
                .input_arg("1")
                .input_arg("-t")
                .input_arg(format!("{:.3}", profile.lead_in_seconds))
                .input(input)
                .video_filter(&conform)
                .video_codec(&profile.codec)
                .preset(&profile.preset)
                .crf(profile.crf)
                .pixel_format(&profile.pixel_format)
                .faststart()
        }
        ThumbnailKind::Video => {
            let mut cmd = FfmpegCommand::new(output)
                .input(input)
                .video_filter(&conform)
                .video_codec(&profile.codec)
                .preset(&profile.preset)
                .crf(profile.crf)
                .pixel_format(&profile.pixel_format)
                .faststart();
            if info.has_audio {
                cmd = cmd
                    .audio_codec(&profile.audio_codec)
                    .audio_bitrate(&profile.audio_bitrate);
            }
            cmd
        }
    };

    FfmpegRunner::new()
        .with_timeout(timeout_secs)
        .run(&cmd)
        .await?;

    let produced = tokio::fs::metadata(output).await;
    match produced {
        Ok(meta) if meta.len() > 0 => Ok(kind),
        _ => Err(MediaError::OutputMissing(output.to_path_buf())),
    }
}
