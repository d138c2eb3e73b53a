#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for ShortCast media processing.
//!
//! This crate provides:
//! - Type-safe multi-input FFmpeg command building
//! - Progress parsing from `-progress pipe:2` and stderr capture
//! - Thumbnail normalization into a lead-in segment
//! - Lead-in + main video concatenation (stream copy or re-encode)
//! - FFprobe-based media inspection

pub mod assemble;
pub mod command;
pub mod error;
pub mod filters;
pub mod normalize;
pub mod probe;
pub mod progress;

pub use assemble::{assemble, AssembledOutput, ConcatStrategy};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use normalize::{normalize_thumbnail, ThumbnailKind};
pub use probe::{probe_media, MediaInfo};
pub use progress::FfmpegProgress;
