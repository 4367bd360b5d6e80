//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Configured path for {field} does not exist: {path}")]
    PathNotFound { field: &'static str, path: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Cohort percentile must be strictly between 0 and 1, got {0}")]
    InvalidPercentile(f64),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
