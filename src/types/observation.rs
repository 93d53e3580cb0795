//! Station measurements as they enter the pipeline and as they come back out of the
//! observation store.

use crate::types::nan_if_null;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading posted by (or on behalf of) a weather station.
///
/// This is the body accepted by the ingestion endpoint. Every numeric field is
/// required; the cleaning step upstream is expected to have filled gaps already.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// INMET station code, e.g. `"A301"`.
    pub station_code: String,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Atmospheric pressure in hPa.
    pub pressure: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Wind direction in degrees.
    pub wind_direction: f64,
    /// Global solar radiation in kJ/m².
    pub radiation: f64,
    /// Precipitation in mm.
    pub precipitation: f64,
}

impl WeatherReading {
    /// Attaches the time the reading was received, producing the row to persist.
    pub fn received_at(self, recorded_at: DateTime<Utc>) -> NewObservation {
        NewObservation {
            recorded_at,
            reading: self,
        }
    }
}

/// A reading stamped with its receive time, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub recorded_at: DateTime<Utc>,
    pub reading: WeatherReading,
}

/// A persisted station measurement.
///
/// Rows are ordered by `(timestamp, id)`. Columns that were NULL in the store are
/// surfaced as `NaN` so that missing values flow through lag features unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub station_code: String,
    #[serde(deserialize_with = "nan_if_null")]
    pub temperature: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub humidity: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub pressure: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub wind_speed: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub wind_direction: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub radiation: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub precipitation: f64,
}

impl Observation {
    /// Builds the stored form of `new` under the given row id.
    pub fn from_new(id: i64, new: NewObservation) -> Self {
        let NewObservation {
            recorded_at,
            reading,
        } = new;
        Self {
            id,
            timestamp: recorded_at,
            station_code: reading.station_code,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            wind_speed: reading.wind_speed,
            wind_direction: reading.wind_direction,
            radiation: reading.radiation,
            precipitation: reading.precipitation,
        }
    }
}
