use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write model artifact '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode model artifact from '{0}'")]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode model artifact")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to parse JSON model artifact '{0}'")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    // Covers errors joining the blocking load task
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegressorError {
    #[error("Regressor expects {expected} features, got {found}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("Regressor produced a non-finite prediction ({0})")]
    NonFinite(f64),

    #[error("Tree {tree} did not reach a leaf")]
    MalformedTree { tree: usize },
}
