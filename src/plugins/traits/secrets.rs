use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use crate::utils::error::{AppError, Result};

/// Trait for wherever the publisher credentials live.
///
/// Implementations may take a named profile; the profile only changes which
/// identity is resolved, never what the pipeline does with it.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    fn name(&self) -> &str;

    /// The raw secret string stored under `secret_id`.
    async fn get_secret(&self, secret_id: &str) -> Result<String>;
}

/// Credentials for the Twitter API v2 (OAuth 2.0 user context).
#[derive(Clone, Deserialize)]
pub struct TwitterCredentials {
    pub access_token: String,
    pub user_id: String,
}

impl TwitterCredentials {
    pub fn from_secret(secret: &str) -> Result<Self> {
        let credentials: TwitterCredentials = serde_json::from_str(secret)
            .map_err(|e| AppError::secret(format!("malformed twitter secret: {}", e)))?;

        if credentials.access_token.trim().is_empty() || credentials.user_id.trim().is_empty() {
            return Err(AppError::secret("twitter secret has an empty access_token or user_id"));
        }
        Ok(credentials)
    }
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}
