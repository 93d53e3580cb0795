use crate::api::error::ApiError;
use crate::forecast::error::{ForecastError, ReconstructError};
use crate::ingest::IngestError;
use crate::model::error::{ArtifactError, RegressorError};
use crate::relay::error::RelayError;
use crate::replay::ReplayError;
use crate::store::error::{ArchiveError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Regressor(#[from] RegressorError),

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Failed to bind {0}")]
    Bind(String, #[source] std::io::Error),

    #[error("Server terminated")]
    Serve(#[source] std::io::Error),
}
