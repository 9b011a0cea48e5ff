use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_REPORT_URL: &str = "https://apps.fas.usda.gov/export-sales/cottfax.htm";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub report: ReportConfig,
    pub schedule: ScheduleConfig,
    pub publisher: PublisherConfig,
    pub secrets: SecretsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub url: String,
    pub request_timeout: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Six-field cron expression (seconds first) used by `watch`.
    pub cron: String,
    pub timezone: String,
    pub cutoff_hour_utc: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    Twitter,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    pub kind: PublisherKind,
    pub api_base: String,
    pub history_limit: u32,
    pub hashtag: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackend {
    Env,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    pub backend: SecretsBackend,
    pub secret_id: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::with_defaults(Config::builder())?
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(&run_mode)).required(false))
            // Local overrides (ignored by git)
            .add_source(File::from(config_dir.join("local")).required(false))
            // Environment variables such as COTTON__PUBLISHER__KIND=log
            .add_source(Environment::with_prefix("COTTON").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("report.url", DEFAULT_REPORT_URL)?
            .set_default("report.request_timeout", 15)?
            .set_default("report.user_agent", "cotton-watcher/0.1")?
            .set_default("schedule.cron", "0 30,31,33,36,40,45,50,55 12,13 * * Mon,Tue,Thu,Fri")?
            .set_default("schedule.timezone", "US/Eastern")?
            .set_default("schedule.cutoff_hour_utc", 13)?
            .set_default("publisher.kind", "twitter")?
            .set_default("publisher.api_base", "https://api.twitter.com")?
            .set_default("publisher.history_limit", 20)?
            .set_default("publisher.hashtag", "#cotton")?
            .set_default("publisher.request_timeout", 15)?
            .set_default("secrets.backend", "env")?
            .set_default("secrets.secret_id", "twitter")?
            .set_default("secrets.directory", "secrets")?
            .set_default("logging.level", "info")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.report.url).is_err() {
            return Err(ConfigError::Message("Invalid report URL format".into()));
        }

        if self.report.request_timeout == 0 {
            return Err(ConfigError::Message("Report request_timeout must be greater than 0".into()));
        }

        if !self.is_valid_cron(&self.schedule.cron) {
            return Err(ConfigError::Message("Invalid cron expression in schedule.cron".into()));
        }

        if self.schedule.timezone.parse::<Tz>().is_err() {
            return Err(ConfigError::Message(format!(
                "Unknown timezone in schedule.timezone: {}",
                self.schedule.timezone
            )));
        }

        if self.schedule.cutoff_hour_utc > 23 {
            return Err(ConfigError::Message("Schedule cutoff_hour_utc must be between 0 and 23".into()));
        }

        if Url::parse(&self.publisher.api_base).is_err() {
            return Err(ConfigError::Message("Invalid publisher api_base format".into()));
        }

        // The timeline endpoint accepts 5..=100 results per page
        if !(5..=100).contains(&self.publisher.history_limit) {
            return Err(ConfigError::Message("Publisher history_limit must be between 5 and 100".into()));
        }

        if self.secrets.secret_id.trim().is_empty() {
            return Err(ConfigError::Message("Secrets secret_id must not be empty".into()));
        }

        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.schedule
            .timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Message(format!("Unknown timezone: {}", e)))
    }

    fn is_valid_cron(&self, cron_expr: &str) -> bool {
        // sec min hour day-of-month month day-of-week [year]
        let parts: Vec<&str> = cron_expr.split_whitespace().collect();
        if parts.len() != 6 && parts.len() != 7 {
            return false;
        }

        parts.iter().all(|part| {
            part.chars().all(|c| {
                c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | ',' | '/' | '?')
            })
        })
    }
}
