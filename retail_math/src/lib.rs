//! # Retail Math
//!
//! Window arithmetic used to turn a single sales series into model features.
//! Every function here operates on one chronologically ordered series; callers
//! are responsible for grouping rows so that windows never cross series.

use thiserror::Error;

pub mod metrics;
pub mod moving_averages;
pub mod shift;

pub use metrics::{root_mean_squared_error, round_to};
pub use moving_averages::{blended_mean_update, rolling_mean, rolling_sum, RollingWindow};
pub use shift::{lag, lead};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
