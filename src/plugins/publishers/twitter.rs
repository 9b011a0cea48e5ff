use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::PublisherConfig;
use crate::plugins::traits::{PostReceipt, PublishedPost, Publisher, SecretProvider, TwitterCredentials};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<TweetData>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Publishes through the Twitter API v2.
///
/// Credentials are fetched from the secret provider on first use and reused
/// until the next `begin_run`.
pub struct TwitterPublisher {
    client: Client,
    api_base: String,
    history_limit: u32,
    secrets: Arc<dyn SecretProvider>,
    secret_id: String,
    credentials: Mutex<Arc<OnceCell<TwitterCredentials>>>,
}

impl TwitterPublisher {
    pub fn new(
        config: &PublisherConfig,
        secrets: Arc<dyn SecretProvider>,
        secret_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            history_limit: config.history_limit,
            secrets,
            secret_id: secret_id.into(),
            credentials: Mutex::new(Arc::new(OnceCell::new())),
        })
    }

    async fn credentials(&self) -> Result<TwitterCredentials> {
        let cell = self
            .credentials
            .lock()
            .map(|cell| Arc::clone(&cell))
            .map_err(|_| AppError::secret("credential cache is poisoned"))?;

        cell.get_or_try_init(|| async {
            let secret = self.secrets.get_secret(&self.secret_id).await?;
            let credentials = TwitterCredentials::from_secret(&secret)?;
            tracing::debug!(
                provider = self.secrets.name(),
                user_id = %credentials.user_id,
                "Loaded twitter credentials"
            );
            Ok(credentials)
        })
        .await
        .cloned()
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::publish(format!("{} failed: {}", action, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication rejected",
            StatusCode::TOO_MANY_REQUESTS => "rate limited",
            _ => "unexpected status",
        };
        Err(AppError::publish(format!(
            "{} failed: {} ({}): {}",
            action,
            reason,
            status,
            body.trim()
        )))
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn begin_run(&self) {
        if let Ok(mut cell) = self.credentials.lock() {
            *cell = Arc::new(OnceCell::new());
        }
    }

    async fn recent_posts(&self) -> Result<Vec<PublishedPost>> {
        let credentials = self.credentials().await?;
        let url = format!("{}/2/users/{}/tweets", self.api_base, credentials.user_id);
        let limit = self.history_limit.to_string();

        let request = self
            .client
            .get(&url)
            .bearer_auth(&credentials.access_token)
            .query(&[("max_results", limit.as_str()), ("tweet.fields", "created_at")]);

        let timeline: TimelineResponse = self
            .send(request, "timeline lookup")
            .await?
            .json()
            .await
            .map_err(|e| AppError::publish(format!("malformed timeline response: {}", e)))?;

        Ok(timeline
            .data
            .into_iter()
            .map(|tweet| PublishedPost {
                id: tweet.id,
                text: tweet.text,
                created_at: tweet.created_at,
            })
            .collect())
    }

    async fn post(&self, text: &str) -> Result<PostReceipt> {
        let credentials = self.credentials().await?;
        let url = format!("{}/2/tweets", self.api_base);

        let request = self
            .client
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .json(&json!({ "text": text }));

        let created: CreateTweetResponse = self
            .send(request, "tweet")
            .await?
            .json()
            .await
            .map_err(|e| AppError::publish(format!("malformed tweet response: {}", e)))?;

        tracing::info!(tweet_id = %created.data.id, "Posted tweet");
        Ok(PostReceipt { id: created.data.id })
    }
}
