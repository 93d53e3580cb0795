//! Accepts station readings and fans them out to the raw archive and the observation
//! table.

use crate::clock::{Clock, SystemClock};
use crate::store::archive::RawArchive;
use crate::store::error::StoreError;
use crate::store::ObservationStore;
use crate::types::observation::WeatherReading;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to persist reading from station '{station}'")]
    Persist {
        station: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub status: String,
    pub id: i64,
    /// Whether the raw JSON copy reached object storage.
    pub archived: bool,
    pub persisted: bool,
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[derive(bon::Builder)]
pub struct IngestService {
    store: Arc<dyn ObservationStore>,
    /// Without an archive, readings only go to the observation table.
    archive: Option<RawArchive>,
    #[builder(default = system_clock())]
    clock: Arc<dyn Clock>,
}

impl IngestService {
    /// Stamps `reading` with the current UTC time, then archives and persists it
    /// concurrently.
    ///
    /// The two writes are independent. A failed archive write is logged and reported in
    /// the receipt; a failed insert fails the whole ingestion even if the archive copy
    /// was written.
    pub async fn ingest(&self, reading: WeatherReading) -> Result<IngestReceipt, IngestError> {
        let received_at = self.clock.now();
        let station = reading.station_code.clone();

        let archive_write = async {
            match &self.archive {
                Some(archive) => archive.put(&reading, received_at).await.is_ok(),
                None => false,
            }
        };
        let insert = self.store.insert(reading.clone().received_at(received_at));
        let (archived, inserted) = futures_util::join!(archive_write, insert);

        let id = inserted.map_err(|source| {
            error!("Reading from {station} was not persisted: {source}");
            IngestError::Persist {
                station: station.clone(),
                source,
            }
        })?;
        if self.archive.is_some() && !archived {
            warn!("Reading {id} from {station} persisted without an archive copy");
        }
        info!("Ingested reading {id} from {station} at {received_at}");

        Ok(IngestReceipt {
            status: "received".to_string(),
            id,
            archived,
            persisted: true,
        })
    }
}
