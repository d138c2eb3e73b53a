//! OAuth2 token exchange.
//!
//! Trades the long-lived refresh token for a short-lived access token via
//! the platform's form-encoded token endpoint. Tokens live only for the
//! duration of one publish job; nothing is cached across jobs.

use std::fmt;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use scast_models::OauthCredentials;

use crate::error::{YoutubeError, YoutubeResult};

/// Bearer token for upload requests.
///
/// Debug output is redacted so the token cannot leak through logs or
/// error chains.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchange a refresh token for an access token.
///
/// Token failures are terminal for the job; no retry happens here.
pub async fn exchange_refresh_token(
    http: &Client,
    token_url: &str,
    credentials: &OauthCredentials,
) -> YoutubeResult<AccessToken> {
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("refresh_token", credentials.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let response = http.post(token_url).form(&params).send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(YoutubeError::auth(format!(
            "token endpoint returned {}: {}",
            status, body
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        YoutubeError::auth(format!("token endpoint returned invalid JSON: {}", e))
    })?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => {
            debug!(expires_in = ?parsed.expires_in, "access token refreshed");
            Ok(AccessToken::new(token))
        }
        _ => Err(YoutubeError::auth(
            "token endpoint response carried no access_token",
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
