//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use scast_models::PublishResponse;
use scast_pipeline::PublishError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Publish(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            // Upstream transfers failed; everything else is our fault.
            ApiError::Publish(e) => match e.stage() {
                "fetch" | "upload" => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn user_message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Invalid publish request",
            ApiError::Publish(e) => match e.stage() {
                "validate" => "Invalid publish request",
                "fetch" => "Could not fetch the source video",
                "normalize" | "assemble" => "Video assembly failed",
                "upload" => "YouTube upload failed",
                _ => "Publish failed",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = PublishResponse::failure(self.user_message(), self.to_string());
        (status, Json(body)).into_response()
    }
}
