//! Error types for the wine-quality pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CuveeError>;

/// Main error type for the pipeline
///
/// Every stage returns this type; I/O, parse, and split failures are
/// distinct variants rather than a catch-all.
#[derive(Error, Debug)]
pub enum CuveeError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Split error: {0}")]
    SplitError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for CuveeError {
    fn from(err: polars::error::PolarsError) -> Self {
        CuveeError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CuveeError {
    fn from(err: serde_json::Error) -> Self {
        CuveeError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CuveeError {
    fn from(err: ndarray::ShapeError) -> Self {
        CuveeError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
