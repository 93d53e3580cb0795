//! Persistence for station observations: the queryable relational table and the raw
//! JSON archive in object storage.

pub mod archive;
pub mod error;
pub mod memory;
pub mod postgres;

use crate::store::error::StoreError;
use crate::types::observation::{NewObservation, Observation};
use futures_util::future::BoxFuture;

/// A time-ordered table of station observations.
///
/// Implementations own their transaction and isolation discipline; callers may issue
/// reads concurrently.
pub trait ObservationStore: Send + Sync {
    /// Persists one observation and returns its row id.
    fn insert(&self, observation: NewObservation) -> BoxFuture<'_, Result<i64, StoreError>>;

    /// Returns up to `limit` observations, newest first, ordered by `(timestamp, id)`.
    /// `station` restricts the result to one station code.
    fn recent<'a>(
        &'a self,
        station: Option<&'a str>,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Observation>, StoreError>>;
}

/// Reads the newest `limit` observations and returns them oldest first.
pub async fn chronological(
    store: &dyn ObservationStore,
    station: Option<&str>,
    limit: usize,
) -> Result<Vec<Observation>, StoreError> {
    let mut rows = store.recent(station, limit).await?;
    rows.reverse();
    Ok(rows)
}
