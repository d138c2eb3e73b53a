//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use scast_drive::{DriveClient, DriveConfig};
use scast_pipeline::{PipelineConfig, Publisher};
use scast_youtube::{YoutubeClient, YoutubeConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub publisher: Arc<Publisher>,
    /// Staging root the readiness probe writes into.
    pub work_dir: PathBuf,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let drive = DriveClient::new(DriveConfig::from_env())?;
        let youtube = YoutubeClient::new(YoutubeConfig::from_env())?;
        let pipeline = PipelineConfig::from_env();

        let work_dir = PathBuf::from(&pipeline.work_dir);
        std::fs::create_dir_all(&work_dir)?;

        let publisher = Publisher::new(drive, youtube, pipeline);

        Ok(Self {
            config,
            publisher: Arc::new(publisher),
            work_dir,
        })
    }
}
