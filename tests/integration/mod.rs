// Shared fixtures for the end-to-end tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cotton_watcher::config::{PublisherConfig, PublisherKind, ReportConfig};
use cotton_watcher::core::{MessageComposer, TimeWindowGate};
use cotton_watcher::plugins::SecretProvider;
use cotton_watcher::plugins::publishers::TwitterPublisher;
use cotton_watcher::scraper::HttpReportSource;
use cotton_watcher::{Pipeline, Result};

pub mod pipeline_tests;
pub mod scraper_tests;

pub const REPORT_PATH: &str = "/export-sales/cottfax.htm";
pub const REPORT_HTML: &str = include_str!("../fixtures/cottfax.html");

pub struct StaticSecrets;

#[async_trait]
impl SecretProvider for StaticSecrets {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_secret(&self, _secret_id: &str) -> Result<String> {
        Ok(r#"{"access_token": "test-token", "user_id": "1001"}"#.to_string())
    }
}

pub fn report_config(server: &MockServer) -> ReportConfig {
    ReportConfig {
        url: format!("{}{}", server.uri(), REPORT_PATH),
        request_timeout: 5,
        user_agent: "cotton-watcher-tests".to_string(),
    }
}

pub async fn mount_report(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
        .mount(server)
        .await;
}

pub async fn mount_timeline(server: &MockServer, texts: &[&str]) {
    let data: Vec<Value> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| json!({"id": (i + 1).to_string(), "text": text}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/2/users/1001/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

/// Pipeline wired against a single mock server standing in for both the
/// report page and the Twitter API. The window gate is bypassed.
pub fn create_test_pipeline(server: &MockServer) -> anyhow::Result<Pipeline> {
    let report = report_config(server);
    let publisher_config = PublisherConfig {
        kind: PublisherKind::Twitter,
        api_base: server.uri(),
        history_limit: 20,
        hashtag: "#cotton".to_string(),
        request_timeout: 5,
    };

    let source = Arc::new(HttpReportSource::new(&report)?);
    let publisher = Arc::new(TwitterPublisher::new(
        &publisher_config,
        Arc::new(StaticSecrets),
        "twitter",
    )?);

    Ok(Pipeline::new(
        source,
        publisher,
        TimeWindowGate::default(),
        MessageComposer::new(report.url.clone(), "#cotton"),
    )
    .ignore_window(true))
}
