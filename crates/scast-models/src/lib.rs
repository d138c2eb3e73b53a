//! Shared data models for the ShortCast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Publish jobs and their media sources
//! - OAuth credentials
//! - Drive share-link parsing
//! - The output render profile
//! - Publish endpoint wire types

pub mod credentials;
pub mod drive_link;
pub mod job;
pub mod render;
pub mod response;

// Re-export common types
pub use credentials::OauthCredentials;
pub use drive_link::{
    direct_download_url, extract_drive_file_id, DriveLinkError, DriveLinkResult,
};
pub use job::{JobId, PublishJob, ThumbnailSource, VideoSource};
pub use render::RenderProfile;
pub use response::PublishResponse;
