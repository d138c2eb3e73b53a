//! Media assembly: splice the normalized lead-in and the main video into
//! one continuous output.
//!
//! Two strategies. When the probed encoding parameters of both inputs are
//! verified equal, the concat demuxer splices without re-encoding. In the
//! general case the inputs differ, so both are re-encoded through a concat
//! filter graph that conforms them to the render profile.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use scast_models::RenderProfile;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{filter_concat_video_only, filter_concat_with_audio, silent_audio_source};
use crate::probe::{probe_media, MediaInfo};

/// Frame rates closer than this are treated as equal.
const FPS_TOLERANCE: f64 = 0.01;

/// Which concatenation strategy was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStrategy {
    /// Concat demuxer with `-c copy`
    StreamCopy,
    /// Concat filter graph with re-encode
    Reencode,
}

impl ConcatStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcatStrategy::StreamCopy => "stream_copy",
            ConcatStrategy::Reencode => "reencode",
        }
    }
}

/// The assembled output with its verified properties.
#[derive(Debug, Clone)]
pub struct AssembledOutput {
    pub path: PathBuf,
    /// Duration in seconds
    pub duration: f64,
    /// Size in bytes
    pub size: u64,
    pub strategy: ConcatStrategy,
}

/// Splice `lead_in` and `main` into `output`.
pub async fn assemble(
    lead_in: impl AsRef<Path>,
    main: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &RenderProfile,
    timeout_secs: u64,
) -> MediaResult<AssembledOutput> {
    let lead_in = lead_in.as_ref();
    let main = main.as_ref();
    let output = output.as_ref();

    for input in [lead_in, main] {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
    }

    let lead_info = probe_media(lead_in).await?;
    let main_info = probe_media(main).await?;

    let strategy = if can_stream_copy(&lead_info, &main_info) {
        ConcatStrategy::StreamCopy
    } else {
        ConcatStrategy::Reencode
    };

    info!(
        lead_duration = lead_info.duration,
        main_duration = main_info.duration,
        strategy = strategy.as_str(),
        "Assembling output"
    );

    // List file for the demuxer path lives outside the output directory
    // and disappears with this handle.
    let scratch = tempfile::tempdir()?;

    let cmd = match strategy {
        ConcatStrategy::StreamCopy => {
            let list_path = scratch.path().join("concat.txt");
            let list = format!(
                "{}\n{}\n",
                concat_list_entry(&tokio::fs::canonicalize(lead_in).await?),
                concat_list_entry(&tokio::fs::canonicalize(main).await?),
            );
            tokio::fs::write(&list_path, list).await?;

            FfmpegCommand::new(output)
                .input_arg("-f")
                .input_arg("concat")
                .input_arg("-safe")
                .input_arg("0")
                .input(&list_path)
                .stream_copy()
        }
        ConcatStrategy::Reencode => {
            build_reencode_command(lead_in, main, output, &lead_info, &main_info, profile)
        }
    };

    let total_ms = ((lead_info.duration + main_info.duration) * 1000.0) as i64;
    FfmpegRunner::new()
        .with_timeout(timeout_secs)
        .run_with_progress(&cmd, move |p| {
            debug!(
                percent = format!("{:.1}", p.percentage(total_ms)),
                speed = p.speed,
                "Assembly progress"
            );
        })
        .await?;

    let meta = tokio::fs::metadata(output).await;
    if !matches!(&meta, Ok(m) if m.len() > 0) {
        return Err(MediaError::OutputMissing(output.to_path_buf()));
    }

    let out_info = probe_media(output).await?;
    info!(
        output = %output.display(),
        duration = out_info.duration,
        size_mb = format!("{:.1}", out_info.size as f64 / 1_048_576.0),
        "Assembly complete"
    );

    Ok(AssembledOutput {
        path: output.to_path_buf(),
        duration: out_info.duration,
        size: out_info.size,
        strategy,
    })
}

/// Build the re-encoding concat command, synthesizing a silent lead-in
/// audio track when only the main video carries audio.
fn build_reencode_command(
    lead_in: &Path,
    main: &Path,
    output: &Path,
    lead_info: &MediaInfo,
    main_info: &MediaInfo,
    profile: &RenderProfile,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output).input(lead_in).input(main);

    let (graph, audio_out) = if main_info.has_audio {
        if lead_info.has_audio {
            (
                filter_concat_with_audio(
                    profile.width,
                    profile.height,
                    profile.frame_rate,
                    "0:a",
                ),
                true,
            )
        } else {
            let lead_duration = if lead_info.duration > 0.0 {
                lead_info.duration
            } else {
                profile.lead_in_seconds
            };
            cmd = cmd
                .input_arg("-t")
                .input_arg(format!("{:.3}", lead_duration))
                .lavfi_input(silent_audio_source());
            (
                filter_concat_with_audio(
                    profile.width,
                    profile.height,
                    profile.frame_rate,
                    "2:a",
                ),
                true,
            )
        }
    } else {
        (
            filter_concat_video_only(profile.width, profile.height, profile.frame_rate),
            false,
        )
    };

    cmd = cmd
        .filter_complex(graph)
        .map("[vout]")
        .video_codec(&profile.codec)
        .preset(&profile.preset)
        .crf(profile.crf)
        .pixel_format(&profile.pixel_format);

    if audio_out {
        cmd = cmd
            .map("[aout]")
            .audio_codec(&profile.audio_codec)
            .audio_bitrate(&profile.audio_bitrate);
    }

    cmd.faststart()
}

/// Stream copy is only safe when every parameter the demuxer cannot
/// reconcile is verified equal.
fn can_stream_copy(lead: &MediaInfo, main: &MediaInfo) -> bool {
    lead.codec == main.codec
        && lead.width == main.width
        && lead.height == main.height
        && lead.pixel_format == main.pixel_format
        && (lead.fps - main.fps).abs() < FPS_TOLERANCE
        && lead.has_audio == main.has_audio
        && (!lead.has_audio || lead.audio_codec == main.audio_codec)
}

/// One line of a concat demuxer list file, with single quotes escaped.
fn concat_list_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', "'\\''");
    format!("file '{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(codec: &str, w: u32, h: u32, fps: f64, audio: bool) -> MediaInfo {
        MediaInfo {
            duration: 10.0,
            width: w,
            height: h,
            fps,
            codec: codec.to_string(),
            pixel_format: Some("yuv420p".to_string()),
            size: 1024,
            has_audio: audio,
            audio_codec: audio.then(|| "aac".to_string()),
            nb_frames: None,
        }
    }

    #[test]
    fn test_stream_copy_requires_equal_parameters() {
        let a = info("h264", 1080, 1920, 30.0, true);
        let b = info("h264", 1080, 1920, 30.0, true);
        assert!(can_stream_copy(&a, &b));

        assert!(!can_stream_copy(&a, &info("hevc", 1080, 1920, 30.0, true)));
        assert!(!can_stream_copy(&a, &info("h264", 720, 1280, 30.0, true)));
        assert!(!can_stream_copy(&a, &info("h264", 1080, 1920, 29.97, true)));
    }

    #[test]
    fn test_stream_copy_requires_matching_audio() {
        let silent_lead = info("h264", 1080, 1920, 30.0, false);
        let voiced_main = info("h264", 1080, 1920, 30.0, true);
        assert!(!can_stream_copy(&silent_lead, &voiced_main));
    }

    #[test]
    fn test_concat_list_entry_escapes_quotes() {
        let entry = concat_list_entry(Path::new("/tmp/it's here/a.mp4"));
        assert_eq!(entry, "file '/tmp/it'\\''s here/a.mp4'");
    }

    #[test]
    fn test_reencode_command_synthesizes_silence_for_voiced_main() {
        let lead = info("h264", 1080, 1920, 30.0, false);
        let main = info("h264", 720, 1280, 30.0, true);
        let cmd = build_reencode_command(
            Path::new("lead.mp4"),
            Path::new("main.mp4"),
            Path::new("out.mp4"),
            &lead,
            &main,
            &RenderProfile::default(),
        );

        let args = cmd.build_args();
        assert!(args.iter().any(|a| a.starts_with("anullsrc=")));
        assert!(args.iter().any(|a| a.contains("concat=n=2:v=1:a=1")));
        assert!(args.contains(&"[aout]".to_string()));
    }

    #[test]
    fn test_reencode_command_video_only_when_main_is_silent() {
        let lead = info("h264", 1080, 1920, 30.0, false);
        let main = info("h264", 720, 1280, 30.0, false);
        let cmd = build_reencode_command(
            Path::new("lead.mp4"),
            Path::new("main.mp4"),
            Path::new("out.mp4"),
            &lead,
            &main,
            &RenderProfile::default(),
        );

        let args = cmd.build_args();
        assert!(!args.iter().any(|a| a.starts_with("anullsrc=")));
        assert!(args.iter().any(|a| a.contains("concat=n=2:v=1:a=0")));
        assert!(!args.contains(&"[aout]".to_string()));
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_probing() {
        let dir = tempfile::tempdir().unwrap();
        let lead = dir.path().join("lead.mp4");
        let main = dir.path().join("main.mp4");
        tokio::fs::write(&lead, b"stub").await.unwrap();

        let err = assemble(
            &lead,
            &main,
            dir.path().join("out.mp4"),
            &RenderProfile::default(),
            60,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(p) if p == main));
    }
}
