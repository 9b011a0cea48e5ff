// Secret provider implementations
pub mod env;
pub mod file;

pub use env::EnvSecretProvider;
pub use file::FileSecretProvider;
