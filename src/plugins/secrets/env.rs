use async_trait::async_trait;

use crate::plugins::traits::SecretProvider;
use crate::utils::error::{AppError, Result};

/// Reads secrets from environment variables.
///
/// `twitter` resolves to `SECRET_TWITTER`, or to `STAGING_SECRET_TWITTER`
/// with the `staging` profile.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider {
    profile: Option<String>,
}

impl EnvSecretProvider {
    pub fn new(profile: Option<String>) -> Self {
        Self { profile }
    }

    pub fn variable_name(&self, secret_id: &str) -> String {
        let id = env_key(secret_id);
        match &self.profile {
            Some(profile) => format!("{}_SECRET_{}", env_key(profile), id),
            None => format!("SECRET_{}", id),
        }
    }
}

fn env_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_secret(&self, secret_id: &str) -> Result<String> {
        let variable = self.variable_name(secret_id);
        std::env::var(&variable)
            .map_err(|e| AppError::secret(format!("cannot read {}: {}", variable, e)))
    }
}
