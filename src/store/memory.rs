use crate::store::error::StoreError;
use crate::store::ObservationStore;
use crate::types::observation::{NewObservation, Observation};
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Rows keyed by `(timestamp, id)`, so reads walk the newest end without sorting.
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<(DateTime<Utc>, i64), Observation>,
    last_id: i64,
}

/// An in-process observation table, for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryObservationStore {
    table: Mutex<Table>,
}

impl MemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl ObservationStore for MemoryObservationStore {
    fn insert(&self, observation: NewObservation) -> BoxFuture<'_, Result<i64, StoreError>> {
        async move {
            let mut table = self.table.lock().await;
            table.last_id += 1;
            let id = table.last_id;
            let row = Observation::from_new(id, observation);
            table.rows.insert((row.timestamp, id), row);
            Ok(id)
        }
        .boxed()
    }

    fn recent<'a>(
        &'a self,
        station: Option<&'a str>,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Observation>, StoreError>> {
        async move {
            let table = self.table.lock().await;
            Ok(table
                .rows
                .values()
                .rev()
                .filter(|row| station.map_or(true, |code| row.station_code == code))
                .take(limit)
                .cloned()
                .collect())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::chronological;
    use crate::test_support::{reading, start_time};
    use chrono::Duration;

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() -> Result<(), StoreError> {
        let store = MemoryObservationStore::new();
        // inserted out of order on purpose
        for hour in [2, 0, 1, 3] {
            store
                .insert(reading(hour as f64).received_at(start_time() + Duration::hours(hour)))
                .await?;
        }
        let rows = store.recent(None, 3).await?;
        let temps: Vec<f64> = rows.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, [3.0, 2.0, 1.0]);

        let oldest_first = chronological(&store, None, 3).await?;
        assert_eq!(oldest_first[0].temperature, 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_filters_station() -> Result<(), StoreError> {
        let store = MemoryObservationStore::new();
        let mut other = reading(30.0);
        other.station_code = "A652".to_string();
        store.insert(other.received_at(start_time())).await?;
        store.insert(reading(20.0).received_at(start_time())).await?;

        let rows = store.recent(Some("A301"), 10).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temperature, 20.0);
        assert_eq!(store.recent(None, 10).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_timestamp_orders_by_id() -> Result<(), StoreError> {
        let store = MemoryObservationStore::new();
        let first = store.insert(reading(1.0).received_at(start_time())).await?;
        let second = store.insert(reading(2.0).received_at(start_time())).await?;
        store
            .insert(reading(0.0).received_at(start_time() - Duration::hours(1)))
            .await?;

        let ids: Vec<i64> = store.recent(None, 2).await?.iter().map(|r| r.id).collect();
        assert_eq!(ids, [second, first]);
        assert_eq!(store.len().await, 3);
        Ok(())
    }
}
