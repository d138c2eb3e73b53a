//! Resumable upload client for the video platform.
//!
//! This crate provides:
//! - OAuth2 refresh-token exchange with redacted token handling
//! - Resumable session initiation against the upload endpoint
//! - Chunked transfer with monotonic offset bookkeeping
//! - Retry with exponential backoff, jitter, and session offset recovery

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod session;
pub mod token;

pub use client::{UploadedVideo, VideoMetadata, YoutubeClient};
pub use config::YoutubeConfig;
pub use error::{YoutubeError, YoutubeResult};
pub use retry::RetryConfig;
pub use session::{ByteRange, ResumableSession};
pub use token::AccessToken;
