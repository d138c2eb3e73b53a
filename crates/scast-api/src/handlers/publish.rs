//! Publish endpoint handler.

use axum::extract::multipart::{Field, Multipart};
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use scast_models::{
    JobId, OauthCredentials, PublishJob, PublishResponse, ThumbnailSource, VideoSource,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Accept a multipart publish request and run it through the pipeline.
///
/// Text fields: `title`, `description`, `publishAt` (RFC 3339), and either
/// `videoUrl` (Drive share link) or a `video` file part. File parts:
/// `thumbnail` (required, image or short video) and optionally `credentials`
/// (JSON document); the credentials can instead arrive as `clientId`,
/// `clientSecret` and `refreshToken` text fields.
pub async fn publish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<PublishResponse>> {
    let mut fields = PublishFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => fields.title = Some(read_text(field, &name).await?),
            "description" => fields.description = Some(read_text(field, &name).await?),
            "publishAt" => fields.publish_at = Some(read_text(field, &name).await?),
            "videoUrl" => fields.video_url = Some(read_text(field, &name).await?),
            "video" => fields.video = Some(read_bytes(field, &name).await?),
            "thumbnail" => fields.thumbnail = Some(read_bytes(field, &name).await?),
            "credentials" => fields.credentials = Some(read_bytes(field, &name).await?),
            "clientId" => fields.client_id = Some(read_text(field, &name).await?),
            "clientSecret" => fields.client_secret = Some(read_text(field, &name).await?),
            "refreshToken" => fields.refresh_token = Some(read_text(field, &name).await?),
            _ => debug!(field = %name, "ignoring unknown form field"),
        }
    }

    let job = fields.into_job()?;
    info!(job_id = %job.id, "publish request accepted");

    let published = state.publisher.publish(&job).await?;
    Ok(Json(PublishResponse::published(published.video_id)))
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Could not read field {name}: {e}")))
}

async fn read_bytes(field: Field<'_>, name: &str) -> Result<Vec<u8>, ApiError> {
    field
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| ApiError::bad_request(format!("Could not read field {name}: {e}")))
}

/// Raw form fields collected before validation.
#[derive(Default)]
struct PublishFields {
    title: Option<String>,
    description: Option<String>,
    publish_at: Option<String>,
    video_url: Option<String>,
    video: Option<Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
    credentials: Option<Vec<u8>>,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
}

impl PublishFields {
    fn into_job(self) -> Result<PublishJob, ApiError> {
        let title = self
            .title
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("title is required"))?;
        let description = self
            .description
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("description is required"))?;

        let publish_at = self
            .publish_at
            .ok_or_else(|| ApiError::bad_request("publishAt is required"))?;
        let publish_at = DateTime::parse_from_rfc3339(publish_at.trim())
            .map_err(|_| ApiError::bad_request("publishAt must be an RFC 3339 timestamp"))?
            .with_timezone(&Utc);

        // A share link wins over an uploaded body when both are present.
        let source = match (self.video_url, self.video) {
            (Some(url), _) if !url.trim().is_empty() => VideoSource::Remote(url),
            (_, Some(bytes)) if !bytes.is_empty() => VideoSource::Inline(bytes),
            _ => {
                return Err(ApiError::bad_request(
                    "either videoUrl or a video file part is required",
                ))
            }
        };

        let thumbnail = self
            .thumbnail
            .filter(|b| !b.is_empty())
            .map(ThumbnailSource::Inline)
            .ok_or_else(|| ApiError::bad_request("thumbnail file part is required"))?;

        let credentials = if let Some(bytes) = self.credentials {
            OauthCredentials::from_json_slice(&bytes)
                .map_err(|_| ApiError::bad_request("credentials file is not a valid JSON document"))?
        } else {
            match (self.client_id, self.client_secret, self.refresh_token) {
                (Some(client_id), Some(client_secret), Some(refresh_token)) => OauthCredentials {
                    client_id,
                    client_secret,
                    refresh_token,
                },
                _ => {
                    return Err(ApiError::bad_request(
                        "credentials are required, either as a JSON file part or as clientId, clientSecret and refreshToken fields",
                    ))
                }
            }
        };

        Ok(PublishJob {
            id: JobId::new(),
            source,
            thumbnail,
            title,
            description,
            publish_at,
            credentials,
        })
    }
}
