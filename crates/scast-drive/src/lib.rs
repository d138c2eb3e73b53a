//! Google Drive fetcher: share-link resolution and streaming download.

pub mod client;
pub mod error;

pub use client::{DriveClient, DriveConfig};
pub use error::{DriveError, DriveResult};
