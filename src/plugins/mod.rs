pub mod publishers;
pub mod secrets;
pub mod traits;

use std::sync::Arc;

use crate::config::{AppConfig, PublisherKind, SecretsBackend};
use crate::utils::error::Result;

pub use traits::{Publisher, SecretProvider};

/// Secret provider selected by configuration, resolving `profile` if given.
pub fn build_secret_provider(config: &AppConfig, profile: Option<String>) -> Arc<dyn SecretProvider> {
    match config.secrets.backend {
        SecretsBackend::Env => Arc::new(secrets::EnvSecretProvider::new(profile)),
        SecretsBackend::File => Arc::new(secrets::FileSecretProvider::new(
            config.secrets.directory.clone(),
            profile,
        )),
    }
}

/// Publisher selected by configuration. `dry_run` always yields the log
/// publisher, whatever the configured kind.
pub fn build_publisher(
    config: &AppConfig,
    secrets: Arc<dyn SecretProvider>,
    dry_run: bool,
) -> Result<Arc<dyn Publisher>> {
    if dry_run || config.publisher.kind == PublisherKind::Log {
        return Ok(Arc::new(publishers::LogPublisher::new()));
    }

    Ok(Arc::new(publishers::TwitterPublisher::new(
        &config.publisher,
        secrets,
        config.secrets.secret_id.clone(),
    )?))
}
