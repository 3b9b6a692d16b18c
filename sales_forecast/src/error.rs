//! Error types for the sales_forecast crate

use std::path::PathBuf;
use store_features::{FeatureError, FeatureVector};
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Model artifact or history file missing or corrupt
    #[error("Load error: {}: {reason}", .path.display())]
    LoadError { path: PathBuf, reason: String },

    /// Derived vector and model disagree on the feature layout
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Model invocation failed; carries the vector that was scored
    #[error("Prediction error: {reason}")]
    PredictError {
        reason: String,
        features: Option<Box<FeatureVector>>,
    },

    /// Raw input outside the accepted domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from parsing the configuration file
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ForecastError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ForecastError::LoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn predict(reason: impl Into<String>, features: &FeatureVector) -> Self {
        ForecastError::PredictError {
            reason: reason.into(),
            features: Some(Box::new(features.clone())),
        }
    }

    /// Feature vector attached to a prediction failure
    pub fn features(&self) -> Option<&FeatureVector> {
        match self {
            ForecastError::PredictError { features, .. } => features.as_deref(),
            _ => None,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<FeatureError> for ForecastError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::SchemaMismatch { .. } | FeatureError::InvalidSchema(_) => {
                ForecastError::SchemaMismatch(err.to_string())
            }
            FeatureError::InvalidInput { .. } => ForecastError::InvalidInput(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
