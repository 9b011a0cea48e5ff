use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

/// A post already on the publisher's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub id: String,
}

/// Trait for the channel that announces reports (Twitter, dry-run log).
///
/// The channel's own history doubles as the record of what has already been
/// announced, so it must be readable as well as writable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Called once at the start of every run that passes the gate. Drops
    /// anything cached for the previous run, such as credentials.
    fn begin_run(&self) {}

    /// Most recent posts, newest first.
    async fn recent_posts(&self) -> Result<Vec<PublishedPost>>;

    async fn post(&self, text: &str) -> Result<PostReceipt>;
}
