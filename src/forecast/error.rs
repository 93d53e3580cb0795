use crate::model::error::{ArtifactError, RegressorError};
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconstructError {
    #[error("Insufficient history: {required} observations required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Model expects feature '{feature}', which the reconstructor does not produce")]
    FeatureMismatch { feature: String },

    #[error("Hour {0} is outside 0..=23")]
    InvalidHour(u32),

    #[error("Lag set is empty")]
    EmptyLagSet,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Forecast model is unavailable")]
    ServiceUnavailable(#[from] ArtifactError),

    #[error("Insufficient history: {required} observations required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Model expects feature '{feature}', which the reconstructor does not produce")]
    FeatureMismatch { feature: String },

    #[error("Missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("Prediction failed")]
    PredictionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Observation store is unavailable")]
    UpstreamUnavailable(#[from] StoreError),
}

impl From<ReconstructError> for ForecastError {
    fn from(e: ReconstructError) -> Self {
        match e {
            ReconstructError::InsufficientHistory {
                required,
                available,
            } => ForecastError::InsufficientHistory {
                required,
                available,
            },
            ReconstructError::FeatureMismatch { feature } => {
                ForecastError::FeatureMismatch { feature }
            }
            other => ForecastError::PredictionFailed(Box::new(other)),
        }
    }
}

impl From<RegressorError> for ForecastError {
    fn from(e: RegressorError) -> Self {
        ForecastError::PredictionFailed(Box::new(e))
    }
}
