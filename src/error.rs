//! Error types for em-fx-scan

use thiserror::Error;

/// Main error type for the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Parse error at row {row}: {message}")]
    ParseError { row: usize, message: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Insufficient data: required {required} observations, available {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
