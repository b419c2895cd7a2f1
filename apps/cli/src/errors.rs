use thiserror::Error;

use crate::llm_client::schema::SchemaViolation;
use crate::llm_client::LlmError;
use crate::models::date::DateParseError;
use crate::models::profile::{DateRangeError, EntryError};

/// Application-level error type.
/// Every pipeline returns `Result<T, AppError>`; nothing is retried or swallowed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parse error: {0}")]
    Parse(#[from] DateParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DateRangeError> for AppError {
    fn from(e: DateRangeError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<EntryError> for AppError {
    fn from(e: EntryError) -> Self {
        match e {
            EntryError::Date(e) => AppError::Parse(e),
            EntryError::Range(e) => e.into(),
        }
    }
}

impl From<SchemaViolation> for AppError {
    fn from(e: SchemaViolation) -> Self {
        AppError::Validation(format!("generated JSON does not match schema {e}"))
    }
}

impl AppError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
