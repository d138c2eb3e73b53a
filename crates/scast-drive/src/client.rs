//! Streaming Drive download client.

use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use scast_models::{direct_download_url, extract_drive_file_id};

use crate::error::{DriveError, DriveResult};

/// Configuration for the Drive client.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Override for the download host; `None` hits Drive itself.
    /// Tests point this at a local mock server.
    pub base_url: Option<String>,
    /// Total deadline for one download request
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl DriveConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SCAST_DRIVE_BASE_URL").ok(),
            timeout: Duration::from_secs(
                std::env::var("SCAST_DRIVE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("SCAST_DRIVE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Client that resolves share links and streams file content to disk.
pub struct DriveClient {
    http: Client,
    config: DriveConfig,
}

impl DriveClient {
    /// Create a new Drive client.
    pub fn new(config: DriveConfig) -> DriveResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("shortcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DriveError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DriveResult<Self> {
        Self::new(DriveConfig::from_env())
    }

    /// Resolve a share link and stream the file to `dest`.
    ///
    /// The link is validated before any request goes out. The body is
    /// copied to disk chunk by chunk, never held in memory whole. Returns
    /// the number of bytes written.
    pub async fn download_to(&self, share_link: &str, dest: impl AsRef<Path>) -> DriveResult<u64> {
        let dest = dest.as_ref();

        let file_id = extract_drive_file_id(share_link)?;
        let url = match &self.config.base_url {
            Some(base) => format!(
                "{}/uc?export=download&id={}",
                base.trim_end_matches('/'),
                file_id
            ),
            None => direct_download_url(&file_id),
        };

        debug!(file_id = %file_id, "Requesting Drive download");

        let mut response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::request_failed(status.as_u16(), body));
        }

        // Drive answers with an HTML confirmation page instead of an error
        // status when it will not serve the bytes directly.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/html"))
            .unwrap_or(false);
        if is_html {
            return Err(DriveError::HtmlInterstitial);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(DriveError::EmptyDownload);
        }

        info!(
            file_id = %file_id,
            size_mb = format!("{:.1}", written as f64 / 1_048_576.0),
            "Source download complete"
        );

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FILE_ID: &str = "1aBcDeFgHiJkLmNoPqRsTuVwXyZ012345";

    fn share_link() -> String {
        format!("https://drive.google.com/file/d/{}/view", FILE_ID)
    }

    async fn client_for(server: &MockServer) -> DriveClient {
        DriveClient::new(DriveConfig {
            base_url: Some(server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_download_streams_body_to_file() {
        let server = MockServer::start().await;
        let payload = vec![7u8; 256 * 1024];

        Mock::given(method("GET"))
            .and(path("/uc"))
            .and(query_param("export", "download"))
            .and(query_param("id", FILE_ID))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(payload.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("source.mp4");

        let written = client_for(&server)
            .await
            .download_to(&share_link(), &dest)
            .await
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client_for(&server)
            .await
            .download_to(&share_link(), dir.path().join("source.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriveError::RequestFailed { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_html_interstitial_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html>confirm download</html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client_for(&server)
            .await
            .download_to(&share_link(), dir.path().join("source.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, DriveError::HtmlInterstitial));
    }

    #[tokio::test]
    async fn test_invalid_link_fails_without_network_call() {
        let server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let err = client_for(&server)
            .await
            .download_to(
                "https://example.com/watch?v=123",
                dir.path().join("source.mp4"),
            )
            .await
            .unwrap_err();

        assert!(err.is_invalid_reference());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "video/mp4"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client_for(&server)
            .await
            .download_to(&share_link(), dir.path().join("source.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, DriveError::EmptyDownload));
    }
}
