use crate::store::error::StoreError;
use crate::store::ObservationStore;
use crate::types::observation::{NewObservation, Observation};
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const TABLE: &str = "weather_measurements";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weather_measurements (
    id BIGSERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL,
    station_code TEXT NOT NULL,
    temperature DOUBLE PRECISION,
    humidity DOUBLE PRECISION,
    pressure DOUBLE PRECISION,
    wind_speed DOUBLE PRECISION,
    wind_direction DOUBLE PRECISION,
    radiation DOUBLE PRECISION,
    precipitation DOUBLE PRECISION
)
"#;

const CREATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS weather_measurements_station_time_idx
    ON weather_measurements (station_code, timestamp DESC)
"#;

#[derive(Debug, sqlx::FromRow)]
struct MeasurementRow {
    id: i64,
    timestamp: DateTime<Utc>,
    station_code: String,
    temperature: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    radiation: Option<f64>,
    precipitation: Option<f64>,
}

impl From<MeasurementRow> for Observation {
    fn from(row: MeasurementRow) -> Self {
        let or_nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
        Observation {
            id: row.id,
            timestamp: row.timestamp,
            station_code: row.station_code,
            temperature: or_nan(row.temperature),
            humidity: or_nan(row.humidity),
            pressure: or_nan(row.pressure),
            wind_speed: or_nan(row.wind_speed),
            wind_direction: or_nan(row.wind_direction),
            radiation: or_nan(row.radiation),
            precipitation: or_nan(row.precipitation),
        }
    }
}

/// Observation table in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgObservationStore {
    pool: PgPool,
}

impl PgObservationStore {
    /// Opens a connection pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the database cannot be reached.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StoreError::Connect)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the measurements table and its lookup index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in [CREATE_TABLE, CREATE_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|source| StoreError::Schema {
                    table: TABLE,
                    source,
                })?;
        }
        info!("Table '{TABLE}' is ready");
        Ok(())
    }
}

impl ObservationStore for PgObservationStore {
    fn insert(&self, observation: NewObservation) -> BoxFuture<'_, Result<i64, StoreError>> {
        async move {
            let NewObservation {
                recorded_at,
                reading,
            } = observation;
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO weather_measurements
                    (timestamp, station_code, temperature, humidity, pressure,
                     wind_speed, wind_direction, radiation, precipitation)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(recorded_at)
            .bind(&reading.station_code)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.pressure)
            .bind(reading.wind_speed)
            .bind(reading.wind_direction)
            .bind(reading.radiation)
            .bind(reading.precipitation)
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| error!("Insert into '{TABLE}' failed: {e}"))?;
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
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows: Vec<MeasurementRow> = sqlx::query_as(
                r#"
                SELECT id, timestamp, station_code, temperature, humidity, pressure,
                       wind_speed, wind_direction, radiation, precipitation
                FROM weather_measurements
                WHERE ($1::text IS NULL OR station_code = $1)
                ORDER BY timestamp DESC, id DESC
                LIMIT $2
                "#,
            )
            .bind(station)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows.into_iter().map(Observation::from).collect())
        }
        .boxed()
    }
}
