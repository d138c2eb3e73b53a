//! OAuth credentials for the publishing account.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth client credentials plus the long-lived refresh token for the
/// channel being published to.
///
/// Accepted either as an uploaded JSON credentials document or as inline
/// request fields, hence the serde aliases. The secret and token never
/// appear in logs: `Debug` redacts them, and the struct is dropped with the
/// job.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OauthCredentials {
    #[serde(alias = "clientId")]
    pub client_id: String,
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

impl OauthCredentials {
    /// Parse a credentials document (JSON bytes, as uploaded).
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// All three fields are present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
            && !self.refresh_token.trim().is_empty()
    }
}

impl fmt::Debug for OauthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OauthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}
