pub mod config;
pub mod core;
pub mod models;
pub mod pipeline;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineStage};
pub use scheduler::ReportScheduler;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
