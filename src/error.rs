//! Error types for the feature pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for feature pipeline operations
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Input unavailable: {}", path.display())]
    InputUnavailable { path: PathBuf },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FeatureError {
    /// True for the two failure kinds a run cannot recover from locally
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            FeatureError::InputUnavailable { .. } | FeatureError::MalformedInput(_)
        )
    }
}

impl From<polars::error::PolarsError> for FeatureError {
    fn from(err: polars::error::PolarsError) -> Self {
        FeatureError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FeatureError {
    fn from(err: serde_json::Error) -> Self {
        FeatureError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for FeatureError {
    fn from(err: serde_yaml::Error) -> Self {
        FeatureError::ConfigError(err.to_string())
    }
}
