use crate::forecast::error::ReconstructError;
use crate::forecast::reconstructor::FeatureReconstructor;
use crate::model::artifact::ModelArtifact;
use crate::model::error::ArtifactError;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// An artifact plus the feature layout resolved against it.
///
/// The layout is resolved once here instead of per request. A layout that disagrees
/// with the artifact does not make the model unusable: manual predictions only need
/// the feature order, so the mismatch is kept and reported by automatic forecasts.
#[derive(Debug)]
pub struct LoadedModel {
    pub artifact: ModelArtifact,
    reconstructor: Result<FeatureReconstructor, ReconstructError>,
}

impl LoadedModel {
    pub fn new(artifact: ModelArtifact) -> Self {
        let reconstructor = FeatureReconstructor::new(&artifact.lags, &artifact.feature_order);
        if let Err(e) = &reconstructor {
            warn!("Automatic forecasts disabled for this artifact: {e}");
        }
        Self {
            artifact,
            reconstructor,
        }
    }

    pub fn reconstructor(&self) -> Result<&FeatureReconstructor, ReconstructError> {
        self.reconstructor.as_ref().map_err(Clone::clone)
    }
}

/// Loads the model artifact at most once per process.
///
/// Concurrent first callers wait on a single load. If that load fails the handle
/// stays empty, so every later call retries until the file becomes loadable.
#[derive(Debug)]
pub struct ModelHandle {
    path: Option<PathBuf>,
    cell: OnceCell<Arc<LoadedModel>>,
}

impl ModelHandle {
    /// A handle that loads `path` lazily on first use.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cell: OnceCell::new(),
        }
    }

    /// A handle around an artifact that is already in memory.
    pub fn preloaded(artifact: ModelArtifact) -> Self {
        Self {
            path: None,
            cell: OnceCell::new_with(Some(Arc::new(LoadedModel::new(artifact)))),
        }
    }

    pub async fn get(&self) -> Result<Arc<LoadedModel>, ArtifactError> {
        self.cell
            .get_or_try_init(|| async {
                let path = self.path.clone().ok_or_else(|| {
                    ArtifactError::Invalid("no artifact path configured".to_string())
                })?;
                info!("Loading model artifact from {}", path.display());
                let artifact =
                    tokio::task::spawn_blocking(move || ModelArtifact::load(&path)).await??;
                Ok::<_, ArtifactError>(Arc::new(LoadedModel::new(artifact)))
            })
            .await
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
