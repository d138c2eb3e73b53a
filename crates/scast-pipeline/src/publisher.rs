//! Publish pipeline orchestration.
//!
//! One job runs as a strict stage sequence: validate, stage the source and
//! thumbnail into the job workspace, normalize the thumbnail into a
//! lead-in segment, assemble the final artifact, upload it. Stages run one
//! at a time and the first failure aborts the rest; the workspace is
//! released after the terminal state no matter which stage failed.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info, info_span, Instrument};

use scast_drive::DriveClient;
use scast_media::{assemble, normalize_thumbnail};
use scast_models::{extract_drive_file_id, PublishJob, ThumbnailSource, VideoSource};
use scast_youtube::{VideoMetadata, YoutubeClient};

use crate::config::PipelineConfig;
use crate::error::{PublishError, PublishResult};
use crate::metrics::{record_failure, record_job, record_stage};
use crate::workspace::JobWorkspace;

/// A successfully published job.
#[derive(Debug, Clone)]
pub struct PublishedVideo {
    pub video_id: String,
}

/// Sequences the publish stages and owns the per-job workspace.
pub struct Publisher {
    drive: DriveClient,
    youtube: YoutubeClient,
    config: PipelineConfig,
}

impl Publisher {
    pub fn new(drive: DriveClient, youtube: YoutubeClient, config: PipelineConfig) -> Self {
        Self {
            drive,
            youtube,
            config,
        }
    }

    /// Run one job to a terminal state and return the remote video id.
    pub async fn publish(&self, job: &PublishJob) -> PublishResult<PublishedVideo> {
        let span = info_span!("publish", job_id = %job.id);

        async move {
            let started = Instant::now();

            // Reference and field validation happens before any filesystem
            // or network work, so a bad request leaves no trace behind.
            self.validate(job)?;

            let mut workspace =
                JobWorkspace::create(Path::new(&self.config.work_dir), &job.id).await?;

            let result = self.run_stages(job, &mut workspace).await;
            workspace.release_all().await;

            let elapsed = started.elapsed().as_secs_f64();
            match &result {
                Ok(published) => {
                    record_job("published", elapsed);
                    info!(
                        video_id = %published.video_id,
                        elapsed_secs = elapsed,
                        "job published"
                    );
                }
                Err(e) => {
                    record_job("failed", elapsed);
                    record_failure(e.stage());
                    error!(stage = e.stage(), elapsed_secs = elapsed, "job failed: {}", e);
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    fn validate(&self, job: &PublishJob) -> PublishResult<()> {
        if job.title.trim().is_empty() {
            return Err(PublishError::validation("title is required"));
        }
        if job.description.trim().is_empty() {
            return Err(PublishError::validation("description is required"));
        }
        if !job.credentials.is_complete() {
            return Err(PublishError::validation(
                "credentials must include clientId, clientSecret and refreshToken",
            ));
        }

        match &job.source {
            VideoSource::Remote(url) => {
                extract_drive_file_id(url)?;
            }
            VideoSource::Inline(bytes) => {
                if bytes.is_empty() {
                    return Err(PublishError::validation("video payload is empty"));
                }
            }
        }

        match &job.thumbnail {
            ThumbnailSource::Inline(bytes) => {
                if bytes.is_empty() {
                    return Err(PublishError::validation("thumbnail payload is empty"));
                }
            }
            ThumbnailSource::Remote(url) => {
                extract_drive_file_id(url)?;
            }
        }

        Ok(())
    }

    async fn run_stages(
        &self,
        job: &PublishJob,
        workspace: &mut JobWorkspace,
    ) -> PublishResult<PublishedVideo> {
        // Stage 1: acquire the main video.
        let main_path = workspace.stage("source.mp4");
        let started = Instant::now();
        match &job.source {
            VideoSource::Remote(url) => {
                let size = self.drive.download_to(url, &main_path).await?;
                info!(
                    size_mb = size as f64 / 1_048_576.0,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "source downloaded"
                );
            }
            VideoSource::Inline(bytes) => {
                tokio::fs::write(&main_path, bytes).await?;
                info!(
                    size_mb = bytes.len() as f64 / 1_048_576.0,
                    "staged inline video"
                );
            }
        }
        record_stage("fetch", started.elapsed().as_secs_f64());

        // Stage 2: stage the raw thumbnail asset next to it.
        let thumb_raw = workspace.stage("thumbnail_raw");
        match &job.thumbnail {
            ThumbnailSource::Inline(bytes) => {
                tokio::fs::write(&thumb_raw, bytes).await?;
            }
            ThumbnailSource::Remote(url) => {
                self.drive.download_to(url, &thumb_raw).await?;
            }
        }

        // Stage 3: normalize the thumbnail into the lead-in segment.
        let lead_in = workspace.stage("lead_in.mp4");
        let started = Instant::now();
        let kind = normalize_thumbnail(
            &thumb_raw,
            &lead_in,
            &self.config.render,
            self.config.ffmpeg_timeout_secs,
        )
        .await
        .map_err(PublishError::Normalization)?;
        record_stage("normalize", started.elapsed().as_secs_f64());
        debug!(kind = ?kind, "thumbnail normalized");

        // Stage 4: concatenate lead-in and main video.
        let final_path = workspace.stage("final.mp4");
        let started = Instant::now();
        let assembled = assemble(
            &lead_in,
            &main_path,
            &final_path,
            &self.config.render,
            self.config.ffmpeg_timeout_secs,
        )
        .await
        .map_err(PublishError::Assembly)?;
        record_stage("assemble", started.elapsed().as_secs_f64());
        info!(
            strategy = assembled.strategy.as_str(),
            duration_secs = assembled.duration,
            size_mb = assembled.size as f64 / 1_048_576.0,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "artifact assembled"
        );

        // Stage 5: upload the assembled artifact.
        let started = Instant::now();
        let metadata = VideoMetadata {
            title: job.title.clone(),
            description: job.description.clone(),
            publish_at: job.publish_at,
        };
        let uploaded = self
            .youtube
            .upload_video(
                &job.credentials,
                &metadata,
                &assembled.path,
                &self.config.upload_content_type,
            )
            .await?;
        record_stage("upload", started.elapsed().as_secs_f64());

        Ok(PublishedVideo {
            video_id: uploaded.video_id,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scast_drive::DriveConfig;
    use scast_models::{JobId, OauthCredentials};
    use scast_youtube::{RetryConfig, YoutubeConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DRIVE_LINK: &str =
        "https://drive.google.com/file/d/1aBcDeFgHiJkLmNoPqRsTuVwXyZ012345/view";

    fn test_job(source: VideoSource) -> PublishJob {
        PublishJob {
            id: JobId::new(),
            source,
            thumbnail: ThumbnailSource::Inline(b"not-a-real-image".to_vec()),
            title: "Morning Short".to_string(),
            description: "A scheduled short".to_string(),
            publish_at: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            credentials: OauthCredentials {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                refresh_token: "refresh-token".to_string(),
            },
        }
    }

    fn test_publisher(drive_base: &str, youtube_base: &str, work_dir: &Path) -> Publisher {
        let drive = DriveClient::new(DriveConfig {
            base_url: Some(drive_base.to_string()),
            ..DriveConfig::default()
        })
        .unwrap();

        let youtube = YoutubeClient::new(YoutubeConfig {
            token_url: format!("{}/token", youtube_base),
            upload_url: format!("{}/upload", youtube_base),
            retry: RetryConfig {
                max_retries: 0,
                base_delay_ms: 1,
                max_delay_ms: 2,
            },
            ..YoutubeConfig::default()
        })
        .unwrap();

        let config = PipelineConfig {
            work_dir: work_dir.to_string_lossy().into_owned(),
            ..PipelineConfig::default()
        };

        Publisher::new(drive, youtube, config)
    }

    fn assert_work_root_empty(work_root: &Path) {
        let entries: Vec<_> = std::fs::read_dir(work_root)
            .map(|iter| iter.collect())
            .unwrap_or_default();
        assert!(entries.is_empty(), "leftover artifacts: {:?}", entries);
    }

    #[tokio::test]
    async fn test_malformed_reference_fails_without_side_effects() {
        let server = MockServer::start().await;
        let work_root = tempfile::tempdir().unwrap();
        let publisher = test_publisher(&server.uri(), &server.uri(), work_root.path());

        let job = test_job(VideoSource::Remote(
            "https://drive.google.com/drive/folders/abc".to_string(),
        ));
        let err = publisher.publish(&job).await.unwrap_err();

        assert!(matches!(err, PublishError::InvalidReference(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
        assert_work_root_empty(work_root.path());
    }

    #[tokio::test]
    async fn test_missing_title_is_validation_error() {
        let server = MockServer::start().await;
        let work_root = tempfile::tempdir().unwrap();
        let publisher = test_publisher(&server.uri(), &server.uri(), work_root.path());

        let mut job = test_job(VideoSource::Inline(b"bytes".to_vec()));
        job.title = "   ".to_string();
        let err = publisher.publish(&job).await.unwrap_err();

        assert!(matches!(err, PublishError::Validation(_)));
        assert_work_root_empty(work_root.path());
    }

    #[tokio::test]
    async fn test_incomplete_credentials_is_validation_error() {
        let server = MockServer::start().await;
        let work_root = tempfile::tempdir().unwrap();
        let publisher = test_publisher(&server.uri(), &server.uri(), work_root.path());

        let mut job = test_job(VideoSource::Inline(b"bytes".to_vec()));
        job.credentials.refresh_token = String::new();
        let err = publisher.publish(&job).await.unwrap_err();

        assert!(matches!(err, PublishError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_inline_video_is_validation_error() {
        let server = MockServer::start().await;
        let work_root = tempfile::tempdir().unwrap();
        let publisher = test_publisher(&server.uri(), &server.uri(), work_root.path());

        let job = test_job(VideoSource::Inline(Vec::new()));
        let err = publisher.publish(&job).await.unwrap_err();

        assert!(matches!(err, PublishError::Validation(_)));
        assert_work_root_empty(work_root.path());
    }

    #[tokio::test]
    async fn test_fetch_failure_releases_workspace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uc"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let work_root = tempfile::tempdir().unwrap();
        let publisher = test_publisher(&server.uri(), &server.uri(), work_root.path());

        let job = test_job(VideoSource::Remote(DRIVE_LINK.to_string()));
        let err = publisher.publish(&job).await.unwrap_err();

        assert!(matches!(err, PublishError::Fetch(_)));
        assert_eq!(err.stage(), "fetch");
        assert_work_root_empty(work_root.path());
    }
}
