use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::plugins::traits::SecretProvider;
use crate::utils::error::{AppError, Result};

const DEFAULT_PROFILE: &str = "default";

/// Reads secrets from `<directory>/<profile>/<secret_id>.json`.
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    directory: PathBuf,
    profile: Option<String>,
}

impl FileSecretProvider {
    pub fn new(directory: impl Into<PathBuf>, profile: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            profile,
        }
    }

    pub fn secret_path(&self, secret_id: &str) -> PathBuf {
        let profile = self.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        self.directory.join(profile).join(format!("{}.json", secret_id))
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_secret(&self, secret_id: &str) -> Result<String> {
        if secret_id.contains(['/', '\\']) || secret_id.contains("..") {
            return Err(AppError::secret(format!("invalid secret id {:?}", secret_id)));
        }

        let path = self.secret_path(secret_id);
        read_secret(&path).await
    }
}

async fn read_secret(path: &Path) -> Result<String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::secret(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(contents.trim().to_string())
}
