use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::ScheduleConfig;
use crate::pipeline::{Pipeline, PipelineOutcome, log_failure};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub run_count: u64,
    pub published_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_outcome: Option<PipelineOutcome>,
    pub last_error: Option<String>,
}

/// Fires the pipeline on a cron schedule, one run at a time.
pub struct ReportScheduler {
    scheduler: JobScheduler,
    pipeline: Arc<Pipeline>,
    stats: Arc<RwLock<RunStats>>,
    // Held for the duration of a run so overlapping ticks queue up
    run_lock: Arc<Mutex<()>>,
    cron: String,
    start_time: DateTime<Utc>,
}

impl ReportScheduler {
    pub async fn new(pipeline: Arc<Pipeline>, config: &ScheduleConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            pipeline,
            stats: Arc::new(RwLock::new(RunStats::default())),
            run_lock: Arc::new(Mutex::new(())),
            cron: config.cron.clone(),
            start_time: Utc::now(),
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let stats = Arc::clone(&self.stats);
        let run_lock = Arc::clone(&self.run_lock);

        let job = Job::new_async(self.cron.as_str(), move |_uuid, _l| {
            let pipeline = Arc::clone(&pipeline);
            let stats = Arc::clone(&stats);
            let run_lock = Arc::clone(&run_lock);

            Box::pin(async move {
                Self::execute_run(pipeline, stats, run_lock).await;
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;
        tracing::info!(cron = %self.cron, "Report scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        let stats = self.get_stats().await;
        tracing::info!(
            runs = stats.run_count,
            published = stats.published_count,
            errors = stats.error_count,
            uptime_seconds = Utc::now().signed_duration_since(self.start_time).num_seconds(),
            "Report scheduler shutdown"
        );
        Ok(())
    }

    /// Runs the pipeline immediately, outside of the schedule.
    pub async fn run_now(&self) -> Option<PipelineOutcome> {
        Self::execute_run(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.stats),
            Arc::clone(&self.run_lock),
        )
        .await
    }

    pub async fn get_stats(&self) -> RunStats {
        self.stats.read().await.clone()
    }

    async fn execute_run(
        pipeline: Arc<Pipeline>,
        stats: Arc<RwLock<RunStats>>,
        run_lock: Arc<Mutex<()>>,
    ) -> Option<PipelineOutcome> {
        let _guard = run_lock.lock().await;
        let now = Utc::now();
        tracing::debug!(at = %now, "Starting scheduled run");

        let result = pipeline.run(now).await;

        let mut stats = stats.write().await;
        stats.run_count += 1;
        stats.last_run = Some(now);

        match result {
            Ok(outcome) => {
                match &outcome {
                    PipelineOutcome::Published { .. } => stats.published_count += 1,
                    _ => stats.skipped_count += 1,
                }
                stats.last_error = None;
                stats.last_outcome = Some(outcome.clone());
                Some(outcome)
            }
            Err(e) => {
                log_failure(&e);
                stats.error_count += 1;
                stats.last_error = Some(e.to_string());
                stats.last_outcome = None;
                None
            }
        }
    }
}
