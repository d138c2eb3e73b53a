//! Resumable upload client.
//!
//! Drives the three-phase upload protocol:
//! 1. Exchange the refresh token for a bearer token.
//! 2. Initiate a resumable session. The server answers with a session URL
//!    in the Location header.
//! 3. Transmit the file as fixed-size chunk PUTs addressed to that URL,
//!    advancing only as the server confirms ranges, until the final chunk
//!    is acknowledged with the created video resource.
//!
//! A chunk that exhausts its retry budget triggers one session offset
//! probe, so a transfer interrupted mid-file resumes from the last byte
//! the server actually stored instead of aborting outright.

use std::io::SeekFrom;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

use scast_models::OauthCredentials;

use crate::config::YoutubeConfig;
use crate::error::{YoutubeError, YoutubeResult};
use crate::metrics::{record_chunk, record_request};
use crate::retry::with_retry;
use crate::session::{parse_range_end, ByteRange, ResumableSession};
use crate::token::{exchange_refresh_token, AccessToken};

/// Scheduled uploads stay private until the platform flips them live.
const UPLOAD_PRIVACY_STATUS: &str = "private";

/// Metadata sent with session initiation.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub publish_at: DateTime<Utc>,
}

/// A successfully published video.
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    #[serde(default)]
    id: Option<String>,
}

/// Outcome of a single chunk update.
enum ChunkOutcome {
    /// Status 308: the server stored the chunk and waits for more. Carries
    /// the highest byte index the server reports as received.
    Accepted { confirmed_through: Option<u64> },
    /// Final 2xx acknowledgment with the creation response body.
    Completed { body: String },
}

/// Outcome of a session offset probe.
enum SessionProbe {
    Incomplete { confirmed_through: Option<u64> },
    Completed { body: String },
}

/// Client for the resumable upload endpoint.
pub struct YoutubeClient {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> YoutubeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("shortcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(YoutubeError::Network)?;

        Ok(Self { http, config })
    }

    /// Upload a file and return the remote video id.
    ///
    /// Credentials are borrowed for the duration of the call and never
    /// stored on the client.
    pub async fn upload_video(
        &self,
        credentials: &OauthCredentials,
        metadata: &VideoMetadata,
        file: &Path,
        content_type: &str,
    ) -> YoutubeResult<UploadedVideo> {
        let total_bytes = tokio::fs::metadata(file).await?.len();

        let token = exchange_refresh_token(&self.http, &self.config.token_url, credentials).await?;

        let mut session = self
            .initiate_session(&token, metadata, total_bytes, content_type)
            .await?;

        info!(
            total_bytes,
            chunk_bytes = self.config.chunk_bytes,
            "resumable upload session initiated"
        );

        self.transfer(&token, &mut session, file, content_type)
            .await
    }

    async fn initiate_session(
        &self,
        token: &AccessToken,
        metadata: &VideoMetadata,
        total_bytes: u64,
        content_type: &str,
    ) -> YoutubeResult<ResumableSession> {
        let url = format!(
            "{}?uploadType=resumable&part=snippet,status",
            self.config.upload_url
        );

        let body = json!({
            "snippet": {
                "title": metadata.title,
                "description": metadata.description,
            },
            "status": {
                "privacyStatus": UPLOAD_PRIVACY_STATUS,
                "publishAt": metadata.publish_at.to_rfc3339(),
            },
        });

        let started = Instant::now();
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", total_bytes)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        record_request(
            "initiate",
            status.as_u16(),
            started.elapsed().as_millis() as f64,
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YoutubeError::session(format!(
                "status {}: {}",
                status, body
            )));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| YoutubeError::session("response carried no Location header"))?;

        Ok(ResumableSession::new(location, total_bytes))
    }

    /// Transmit the file chunk by chunk until the server confirms creation.
    async fn transfer(
        &self,
        token: &AccessToken,
        session: &mut ResumableSession,
        path: &Path,
        content_type: &str,
    ) -> YoutubeResult<UploadedVideo> {
        let mut file = tokio::fs::File::open(path).await?;
        let total = session.total_bytes();
        let location = session.location().to_string();

        while let Some(range) = session.next_range(self.config.chunk_bytes) {
            file.seek(SeekFrom::Start(range.start)).await?;
            let mut chunk = vec![0u8; range.len() as usize];
            file.read_exact(&mut chunk).await?;

            let attempt = with_retry(&self.config.retry, "chunk", || {
                let body = chunk.clone();
                let location = location.as_str();
                async move {
                    self.put_chunk(token, location, range, total, content_type, body)
                        .await
                }
            })
            .await;

            let outcome = match attempt {
                Ok(outcome) => outcome,
                Err(e) if e.is_retryable() => {
                    // Budget exhausted mid-transfer. Ask the server how far
                    // it actually got before giving up on the session.
                    match self.probe_session(token, &location, total).await {
                        Ok(SessionProbe::Completed { body }) => {
                            session.confirm_all();
                            return finalize(&body);
                        }
                        Ok(SessionProbe::Incomplete {
                            confirmed_through: Some(high),
                        }) if high.saturating_add(1) > session.bytes_confirmed() => {
                            warn!(
                                confirmed = high + 1,
                                total, "recovered session offset after failed chunk, resuming"
                            );
                            session.confirm_through(high);
                            continue;
                        }
                        _ => {
                            return Err(YoutubeError::chunk_upload(
                                range.start,
                                range.end,
                                e.to_string(),
                            ));
                        }
                    }
                }
                Err(e) => {
                    return Err(YoutubeError::chunk_upload(
                        range.start,
                        range.end,
                        e.to_string(),
                    ));
                }
            };

            match outcome {
                ChunkOutcome::Accepted { confirmed_through } => {
                    let before = session.bytes_confirmed();
                    session.confirm_through(confirmed_through.unwrap_or(range.end));
                    if session.bytes_confirmed() == before {
                        return Err(YoutubeError::chunk_upload(
                            range.start,
                            range.end,
                            "server accepted the chunk without advancing the confirmed offset",
                        ));
                    }
                    record_chunk(session.bytes_confirmed() - before);
                    debug!(
                        start = range.start,
                        end = range.end,
                        confirmed = session.bytes_confirmed(),
                        total,
                        "chunk accepted"
                    );
                }
                ChunkOutcome::Completed { body } => {
                    session.confirm_all();
                    record_chunk(range.len());
                    return finalize(&body);
                }
            }
        }

        Err(YoutubeError::incomplete_upload(
            "server confirmed every byte without returning a creation response",
        ))
    }

    async fn put_chunk(
        &self,
        token: &AccessToken,
        location: &str,
        range: ByteRange,
        total: u64,
        content_type: &str,
        body: Vec<u8>,
    ) -> YoutubeResult<ChunkOutcome> {
        let started = Instant::now();
        let response = self
            .http
            .put(location)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, range.len())
            .header(CONTENT_RANGE, range.content_range(total))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        record_request(
            "chunk",
            status.as_u16(),
            started.elapsed().as_millis() as f64,
        );

        // 308 here is the protocol's resume-incomplete signal, not a
        // redirect; it carries no Location, only a Range header.
        if status == StatusCode::PERMANENT_REDIRECT {
            let confirmed_through = response
                .headers()
                .get(RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_range_end);
            return Ok(ChunkOutcome::Accepted { confirmed_through });
        }

        if status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(ChunkOutcome::Completed { body });
        }

        Err(error_from_response(status, response).await)
    }

    /// Ask the server how many bytes of the session it has stored.
    ///
    /// Sent as an empty update covering `bytes */{total}`. A 308 reply
    /// carries the confirmed range; a 2xx reply means the upload already
    /// finished before the last failure.
    async fn probe_session(
        &self,
        token: &AccessToken,
        location: &str,
        total: u64,
    ) -> YoutubeResult<SessionProbe> {
        let started = Instant::now();
        let response = self
            .http
            .put(location)
            .bearer_auth(token.as_str())
            .header(CONTENT_LENGTH, 0_u64)
            .header(CONTENT_RANGE, format!("bytes */{}", total))
            .send()
            .await?;

        let status = response.status();
        record_request(
            "probe",
            status.as_u16(),
            started.elapsed().as_millis() as f64,
        );

        if status == StatusCode::PERMANENT_REDIRECT {
            let confirmed_through = response
                .headers()
                .get(RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_range_end);
            return Ok(SessionProbe::Incomplete { confirmed_through });
        }

        if status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(SessionProbe::Completed { body });
        }

        Err(error_from_response(status, response).await)
    }
}

/// Map an HTTP error response to the matching variant, honoring Retry-After.
async fn error_from_response(status: StatusCode, response: reqwest::Response) -> YoutubeError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let after_ms = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        if let Some(ms) = after_ms {
            return YoutubeError::RateLimited(ms);
        }
    }

    let body = response.text().await.unwrap_or_default();
    YoutubeError::from_http_status(status.as_u16(), body)
}

/// Extract the created video id from the final acknowledgment body.
fn finalize(body: &str) -> YoutubeResult<UploadedVideo> {
    let created: CreatedResource = serde_json::from_str(body).map_err(|_| {
        YoutubeError::incomplete_upload(format!("unparseable creation response: {}", body))
    })?;

    match created.id {
        Some(id) if !id.is_empty() => {
            info!(video_id = %id, "upload completed");
            Ok(UploadedVideo { video_id: id })
        }
        _ => Err(YoutubeError::incomplete_upload(format!(
            "creation response carried no video id: {}",
            body
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
