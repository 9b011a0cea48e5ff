pub mod publisher;
pub mod secrets;

pub use publisher::{PostReceipt, PublishedPost, Publisher};
pub use secrets::{SecretProvider, TwitterCredentials};
