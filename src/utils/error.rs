use thiserror::Error;

use crate::pipeline::PipelineStage;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Conversion error: {value:?} at [{row}, {column}] is not a number")]
    Conversion {
        value: String,
        row: String,
        column: String,
    },

    #[error("Publish error: {message}")]
    Publish { message: String },

    #[error("Secret error: {message}")]
    Secret { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }

    pub fn publish(message: impl Into<String>) -> Self {
        AppError::Publish {
            message: message.into(),
        }
    }

    pub fn secret(message: impl Into<String>) -> Self {
        AppError::Secret {
            message: message.into(),
        }
    }

    /// Tags the error with the pipeline stage it escaped from.
    /// An error that already carries a stage keeps the innermost one.
    pub fn at(self, stage: PipelineStage) -> Self {
        match self {
            AppError::Stage { .. } => self,
            other => AppError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any stage wrappers removed.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            AppError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_conversion_error_display() {
        let err = AppError::Conversion {
            value: "n/a".to_string(),
            row: "total".to_string(),
            column: "exports".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conversion error: \"n/a\" at [total, exports] is not a number"
        );
    }

    #[test]
    fn test_stage_wrapping_keeps_root() {
        let err = AppError::parse("no COUNTRY row").at(PipelineStage::Normalize);
        assert_eq!(err.stage(), Some(PipelineStage::Normalize));
        assert!(matches!(err.root(), AppError::Parse { .. }));
        assert_eq!(
            err.to_string(),
            "normalize stage failed: Parsing error: no COUNTRY row"
        );
    }

    #[test]
    fn test_stage_wrapping_is_not_nested() {
        let err = AppError::publish("rate limited")
            .at(PipelineStage::Publish)
            .at(PipelineStage::Aggregate);
        assert_eq!(err.stage(), Some(PipelineStage::Publish));
    }
}
