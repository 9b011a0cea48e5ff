use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use cotton_watcher::pipeline::log_failure;
use cotton_watcher::utils::logging::init_tracing;
use cotton_watcher::{AppConfig, Pipeline, PipelineOutcome, ReportScheduler};

#[derive(Debug, Parser)]
#[command(name = "cotton-watcher", version, about = "Announces the weekly cotton export sales report")]
struct Cli {
    /// Directory holding default/<RUN_MODE>/local configuration files
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the pipeline once
    Run {
        /// Secret profile to resolve credentials under
        #[arg(long)]
        profile: Option<String>,
        /// Log the message instead of posting it
        #[arg(long)]
        dry_run: bool,
        /// Skip the publication window check
        #[arg(long)]
        ignore_window: bool,
    },
    /// Print the message for the report currently published
    Preview {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Run on the configured cron schedule until interrupted
    Watch {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config_dir)
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Command::Run {
            profile,
            dry_run,
            ignore_window,
        } => {
            let pipeline = Pipeline::from_config(&config, profile, dry_run)?.ignore_window(ignore_window);
            match pipeline.run(Utc::now()).await {
                Ok(outcome) => {
                    info!(outcome = ?outcome, "Run finished");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    log_failure(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Preview { profile } => {
            // Preview never posts, so the log publisher is always enough
            let pipeline = Pipeline::from_config(&config, profile, true)?;
            match pipeline.preview().await {
                Ok(PipelineOutcome::Composed { message, .. }) => {
                    println!("{}", message);
                    Ok(ExitCode::SUCCESS)
                }
                Ok(other) => {
                    info!(outcome = ?other, "Nothing to preview");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    log_failure(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Watch { profile, dry_run } => {
            let pipeline = Arc::new(Pipeline::from_config(&config, profile, dry_run)?);
            let mut scheduler = ReportScheduler::new(pipeline, &config.schedule).await?;
            scheduler.start().await?;

            info!("Starting Cotton Watcher...");
            tokio::signal::ctrl_c().await?;
            info!("Shutting down...");

            scheduler.shutdown().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
