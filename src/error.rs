//! Error types for the EDA pipeline

use thiserror::Error;

/// Errors that can occur while loading, aligning, or exporting EDA data
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid clock time '{0}': expected H:M:S")]
    TimeFormat(String),

    #[error("Malformed log file {path}: {reason}")]
    LogFormat { path: String, reason: String },

    #[error("No schedule entry for {0}")]
    ScheduleLookup(String),

    #[error("Unrecognized log file name '{0}'")]
    FileName(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
