use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::core::{
    LargestTableSelector, MessageComposer, TableSelector, TimeWindowGate, export_figures,
    extract_report_date, last_announced_date, normalize,
};
use crate::models::{RawTable, ReportDate};
use crate::plugins::{self, Publisher};
use crate::scraper::{HttpReportSource, ReportSource};
use crate::utils::error::{AppError, Result};

/// Steps of a run, in order. Errors are tagged with the step they escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Fetch,
    Select,
    ExtractDate,
    Dedup,
    Normalize,
    Aggregate,
    Publish,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Select => "select",
            PipelineStage::ExtractDate => "extract_date",
            PipelineStage::Dedup => "dedup",
            PipelineStage::Normalize => "normalize",
            PipelineStage::Aggregate => "aggregate",
            PipelineStage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Outside the publication window; nothing was fetched.
    Gated,
    /// The report on the page has already been announced.
    Duplicate {
        found: ReportDate,
        last_announced: ReportDate,
    },
    Published {
        date: ReportDate,
        message: String,
        post_id: String,
    },
    /// Preview only: the message that would be posted.
    Composed { date: ReportDate, message: String },
}

pub struct Pipeline {
    source: Arc<dyn ReportSource>,
    selector: Box<dyn TableSelector>,
    publisher: Arc<dyn Publisher>,
    gate: TimeWindowGate,
    composer: MessageComposer,
    ignore_window: bool,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ReportSource>,
        publisher: Arc<dyn Publisher>,
        gate: TimeWindowGate,
        composer: MessageComposer,
    ) -> Self {
        Self {
            source,
            selector: Box::new(LargestTableSelector),
            publisher,
            gate,
            composer,
            ignore_window: false,
        }
    }

    /// Wires the production pipeline from configuration.
    pub fn from_config(config: &AppConfig, profile: Option<String>, dry_run: bool) -> Result<Self> {
        let timezone = config.timezone()?;
        let source = Arc::new(HttpReportSource::new(&config.report)?);
        let secrets = plugins::build_secret_provider(config, profile);
        let publisher = plugins::build_publisher(config, secrets, dry_run)?;

        Ok(Self::new(
            source,
            publisher,
            TimeWindowGate::new(timezone, config.schedule.cutoff_hour_utc),
            MessageComposer::new(config.report.url.clone(), config.publisher.hashtag.clone()),
        ))
    }

    pub fn with_selector(mut self, selector: Box<dyn TableSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn ignore_window(mut self, ignore: bool) -> Self {
        self.ignore_window = ignore;
        self
    }

    /// One scheduled invocation: announce the report on the page unless it is
    /// outside the window or already announced.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<PipelineOutcome> {
        let start_time = Instant::now();

        if !self.ignore_window && !self.gate.should_run(now) {
            tracing::info!("Outside the publication window, skipping");
            return Ok(PipelineOutcome::Gated);
        }
        self.publisher.begin_run();

        let table = self.fetch_report_table().await?;
        let found = extract_report_date(&table).map_err(|e| e.at(PipelineStage::ExtractDate))?;

        let history = self
            .publisher
            .recent_posts()
            .await
            .map_err(|e| e.at(PipelineStage::Dedup))?;
        let last_announced = last_announced_date(&history);
        tracing::info!(found = %found, last_announced = %last_announced, "Compared report dates");

        if found <= last_announced {
            tracing::info!(found = %found, "Report already announced");
            return Ok(PipelineOutcome::Duplicate {
                found,
                last_announced,
            });
        }

        let message = self.compose_message(&table, found)?;
        let receipt = self
            .publisher
            .post(&message)
            .await
            .map_err(|e| e.at(PipelineStage::Publish))?;

        tracing::info!(
            date = %found,
            post_id = %receipt.id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Published export sales"
        );
        Ok(PipelineOutcome::Published {
            date: found,
            message,
            post_id: receipt.id,
        })
    }

    /// Builds the message for the report currently on the page, ignoring the
    /// window and the publisher's history.
    pub async fn preview(&self) -> Result<PipelineOutcome> {
        let table = self.fetch_report_table().await?;
        let date = extract_report_date(&table).map_err(|e| e.at(PipelineStage::ExtractDate))?;
        let message = self.compose_message(&table, date)?;
        Ok(PipelineOutcome::Composed { date, message })
    }

    async fn fetch_report_table(&self) -> Result<RawTable> {
        let tables = self
            .source
            .fetch_tables()
            .await
            .map_err(|e| e.at(PipelineStage::Fetch))?;
        tracing::debug!(candidates = tables.len(), strategy = self.selector.name(), "Selecting report table");

        self.selector
            .select(tables)
            .map_err(|e| e.at(PipelineStage::Select))
    }

    fn compose_message(&self, table: &RawTable, date: ReportDate) -> Result<String> {
        let normalized = normalize(table).map_err(|e| e.at(PipelineStage::Normalize))?;
        tracing::debug!(
            columns = ?normalized.columns(),
            rows = normalized.rows().len(),
            "Normalized report table"
        );

        let figures = export_figures(&normalized).map_err(|e| e.at(PipelineStage::Aggregate))?;
        Ok(self.composer.compose(date, &figures))
    }
}

/// Logs a failed run with its stage; the scheduler's next tick is the retry.
pub fn log_failure(err: &AppError) {
    match err.stage() {
        Some(stage) => tracing::error!(stage = %stage, error = %err.root(), "Pipeline run failed"),
        None => tracing::error!(error = %err, "Pipeline run failed"),
    }
}
