//! FFmpeg video filter definitions.

/// Cover-fit a frame to the target: scale to fill, center-crop the
/// overflow, reset the sample aspect ratio.
pub fn filter_cover_fit(width: u32, height: u32) -> String {
    format!(
        "scale={}:{}:force_original_aspect_ratio=increase,crop={}:{},setsar=1",
        width, height, width, height
    )
}

/// Conform a segment for concatenation: cover-fit plus a fixed frame rate.
pub fn filter_conform(width: u32, height: u32, fps: u32) -> String {
    format!("{},fps={}", filter_cover_fit(width, height), fps)
}

/// Concat graph for lead-in (input 0) + main video (input 1), video only.
pub fn filter_concat_video_only(width: u32, height: u32, fps: u32) -> String {
    let conform = filter_conform(width, height, fps);
    format!(
        "[0:v]{conform}[v0];\
         [1:v]{conform}[v1];\
         [v0][v1]concat=n=2:v=1:a=0[vout]"
    )
}

/// Concat graph for lead-in (input 0) + main video (input 1) carrying one
/// audio lane. `lead_audio` names the audio stream spliced ahead of the
/// main audio: `0:a` when the lead-in has its own track, or the specifier
/// of a silent lavfi input.
pub fn filter_concat_with_audio(width: u32, height: u32, fps: u32, lead_audio: &str) -> String {
    let conform = filter_conform(width, height, fps);
    format!(
        "[0:v]{conform}[v0];\
         [1:v]{conform}[v1];\
         [v0][{lead_audio}][v1][1:a]concat=n=2:v=1:a=1[vout][aout]"
    )
}

/// Spec for a silent stereo source matching the lead-in's duration.
pub fn silent_audio_source() -> &'static str {
    "anullsrc=channel_layout=stereo:sample_rate=44100"
}
