//! The on-disk model bundle produced by the training pipeline.

use crate::model::error::ArtifactError;
use crate::model::regressor::Regressor;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Hold-out accuracy of the regressor, reported alongside every automatic forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// A fitted regressor together with the feature contract it was trained on.
///
/// Artifacts are immutable once loaded; the service shares one instance for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub regressor: Regressor,
    /// Exact column order the regressor expects.
    pub feature_order: Vec<String>,
    /// Lag offsets, in sampling intervals, used to build the lag features.
    pub lags: Vec<u32>,
    pub metrics: ModelMetrics,
}

impl ModelArtifact {
    /// Reads and validates an artifact. `.json` files are parsed as JSON, anything
    /// else as bincode.
    ///
    /// This does blocking file I/O; async callers go through
    /// [`crate::ModelHandle`], which runs it on the blocking pool.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let bytes =
            std::fs::read(path).map_err(|e| ArtifactError::Read(path.to_path_buf(), e))?;
        let artifact = if is_json(path) {
            serde_json::from_slice::<ModelArtifact>(&bytes)
                .map_err(|e| ArtifactError::Json(path.to_path_buf(), e))?
        } else {
            let (decoded, _) =
                bincode::serde::decode_from_slice::<ModelArtifact, _>(&bytes, BINCODE_CONFIG)
                    .map_err(|e| ArtifactError::Decode(path.to_path_buf(), Box::from(e)))?;
            decoded
        };
        artifact.validate()?;
        info!(
            "Loaded model artifact from {} ({} features, lags {:?})",
            path.display(),
            artifact.feature_order.len(),
            artifact.lags
        );
        Ok(artifact)
    }

    /// Writes the artifact in the format implied by the file extension.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(self).map_err(|e| ArtifactError::Json(path.to_path_buf(), e))?
        } else {
            bincode::serde::encode_to_vec(self, BINCODE_CONFIG)
                .map_err(|e| ArtifactError::Encode(Box::new(e)))?
        };
        std::fs::write(path, bytes).map_err(|e| ArtifactError::Write(path.to_path_buf(), e))
    }

    /// Largest configured lag.
    pub fn max_lag(&self) -> u32 {
        self.lags.iter().copied().max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_order.is_empty() {
            return Err(ArtifactError::Invalid("feature order is empty".to_string()));
        }
        let mut seen = HashSet::with_capacity(self.feature_order.len());
        for name in &self.feature_order {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::Invalid(format!(
                    "feature '{name}' appears more than once"
                )));
            }
        }
        if self.lags.is_empty() {
            return Err(ArtifactError::Invalid("lag set is empty".to_string()));
        }
        if self.lags.contains(&0) {
            return Err(ArtifactError::Invalid("lags must be positive".to_string()));
        }
        if self.regressor.width() != self.feature_order.len() {
            return Err(ArtifactError::Invalid(format!(
                "regressor expects {} features but feature order lists {}",
                self.regressor.width(),
                self.feature_order.len()
            )));
        }
        self.regressor.check()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
