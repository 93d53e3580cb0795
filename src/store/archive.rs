use crate::config::ArchiveConfig;
use crate::store::error::ArchiveError;
use crate::types::observation::WeatherReading;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectStorePath;
use object_store::ObjectStore;
use std::sync::Arc;

/// Raw readings as JSON objects, one per ingestion, kept for audit and retraining.
#[derive(Debug, Clone)]
pub struct RawArchive {
    store: Arc<dyn ObjectStore>,
}

impl RawArchive {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Connects to an S3-compatible endpoint such as MinIO.
    ///
    /// The bucket has to exist already; it is not created here.
    pub fn from_config(config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.allow_http)
            .build()
            .map_err(|source| ArchiveError::Configure {
                bucket: config.bucket.clone(),
                source,
            })?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Lists the bucket root once, failing when the endpoint or bucket is missing.
    pub async fn check(&self) -> Result<(), ArchiveError> {
        self.store
            .list_with_delimiter(None)
            .await
            .map(|_| ())
            .map_err(ArchiveError::Unreachable)
    }

    /// Object key for a reading: `<station_code>_<YYYYmmddHHMMSS>.json`.
    pub fn object_key(station_code: &str, at: DateTime<Utc>) -> String {
        format!("{station_code}_{}.json", at.format("%Y%m%d%H%M%S"))
    }

    /// Writes `reading` under its key and returns the key.
    pub async fn put(
        &self,
        reading: &WeatherReading,
        at: DateTime<Utc>,
    ) -> Result<String, ArchiveError> {
        let key = Self::object_key(&reading.station_code, at);
        let body = serde_json::to_vec(reading)
            .map_err(|e| ArchiveError::Serialize(key.clone(), e))?;

        match self
            .store
            .put(&ObjectStorePath::from(key.as_str()), body.into())
            .await
        {
            Ok(_) => {
                debug!("Archived reading as '{key}'");
                Ok(key)
            }
            Err(source) => {
                warn!("Archive write for '{key}' failed: {source}");
                Err(ArchiveError::Write { key, source })
            }
        }
    }
}
