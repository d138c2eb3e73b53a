//! Publish pipeline.
//!
//! This crate provides:
//! - The stage orchestrator running each job to a terminal state
//! - Per-job workspace tracking with guaranteed release
//! - The pipeline error taxonomy mapped from every stage crate

pub mod config;
pub mod error;
pub mod metrics;
pub mod publisher;
pub mod workspace;

pub use config::PipelineConfig;
pub use error::{PublishError, PublishResult};
pub use publisher::{PublishedVideo, Publisher};
pub use workspace::JobWorkspace;
