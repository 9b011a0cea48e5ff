use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use crate::plugins::traits::{PostReceipt, PublishedPost, Publisher};
use crate::utils::error::{AppError, Result};

/// Dry-run publisher: writes messages to the log instead of a live channel.
///
/// Posts are remembered in memory, so a long-running `watch --dry-run` still
/// exercises the duplicate check.
#[derive(Debug, Default)]
pub struct LogPublisher {
    posts: Mutex<Vec<PublishedPost>>,
}

impl LogPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<PublishedPost>) -> Self {
        Self {
            posts: Mutex::new(history),
        }
    }

    pub fn posted(&self) -> Vec<PublishedPost> {
        self.posts
            .lock()
            .map(|posts| posts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    async fn recent_posts(&self) -> Result<Vec<PublishedPost>> {
        let posts = self
            .posts
            .lock()
            .map_err(|_| AppError::publish("log publisher history is poisoned"))?;
        Ok(posts.iter().rev().cloned().collect())
    }

    async fn post(&self, text: &str) -> Result<PostReceipt> {
        let mut posts = self
            .posts
            .lock()
            .map_err(|_| AppError::publish("log publisher history is poisoned"))?;

        let id = format!("dry-run-{}", posts.len() + 1);
        tracing::info!(post_id = %id, "Dry run, not posting:\n{}", text);
        posts.push(PublishedPost {
            id: id.clone(),
            text: text.to_string(),
            created_at: Some(Utc::now()),
        });
        Ok(PostReceipt { id })
    }
}
