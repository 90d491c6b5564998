//! Error types for the stock_forecast crate

use retail_data::DataError;
use retail_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the stock_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error loading or enriching input data
    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    /// Error from series arithmetic
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// A persisted model or encoder artifact is absent
    #[error("Missing artifact: {0}")]
    MissingArtifact(PathBuf),

    /// Error fitting, running or persisting the regressor
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading or writing CSV
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error encoding or decoding JSON artifacts
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing the configuration file
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
