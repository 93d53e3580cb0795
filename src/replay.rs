//! Replays a cleaned station CSV through the ingestion API, row by row, to seed the
//! observation history or drive a demo.

use crate::config::ReplayConfig;
use crate::relay::client::ForecastClient;
use crate::relay::error::RelayError;
use crate::relay::publisher::DashboardPublisher;
use crate::types::observation::WeatherReading;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::task;
use tokio_util::sync::CancellationToken;

const COL_DATETIME: &str = "datetime";
const COL_TEMP: &str = "Temp";
const COL_UMI: &str = "Umi";
const COL_VENTO: &str = "Vento";
const COL_RAD: &str = "Rad";
const COL_CHUVA: &str = "Chuva";

/// The cleaned file carries neither pressure nor wind direction.
const STANDARD_PRESSURE: f64 = 1013.25;
const DEFAULT_WIND_DIRECTION: f64 = 0.0;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Column '{0}' is missing or not numeric")]
    Column(String, #[source] PolarsError),

    #[error("Row {row}: cannot parse datetime '{value}'")]
    InvalidDatetime { row: usize, value: String },

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Background task failed")]
    TaskJoin(#[from] task::JoinError),
}

/// A reading with the time it was originally measured at.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedReading {
    pub datetime: DateTime<Utc>,
    pub reading: WeatherReading,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub total: usize,
    pub ingested: usize,
    pub published: usize,
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn read_frame(path: &Path) -> Result<DataFrame, ReplayError> {
    let numeric = [COL_TEMP, COL_UMI, COL_VENTO, COL_RAD, COL_CHUVA];
    let mut columns = vec![col(COL_DATETIME).cast(DataType::String)];
    columns.extend(numeric.iter().map(|name| col(*name).cast(DataType::Float64)));

    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .and_then(|frame| frame.select(columns).collect())
        .map_err(|e| ReplayError::CsvRead(path.to_path_buf(), e))
}

fn float_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, ReplayError> {
    df.column(name)
        .and_then(|c| c.f64())
        .map_err(|e| ReplayError::Column(name.to_string(), e))
}

fn frame_to_readings(df: &DataFrame, station_code: &str) -> Result<Vec<TimedReading>, ReplayError> {
    let datetimes = df
        .column(COL_DATETIME)
        .and_then(|c| c.str())
        .map_err(|e| ReplayError::Column(COL_DATETIME.to_string(), e))?;
    let temp = float_column(df, COL_TEMP)?;
    let umi = float_column(df, COL_UMI)?;
    let vento = float_column(df, COL_VENTO)?;
    let rad = float_column(df, COL_RAD)?;
    let chuva = float_column(df, COL_CHUVA)?;

    let mut readings = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let raw = datetimes.get(row).unwrap_or_default();
        let datetime = parse_datetime(raw).ok_or_else(|| ReplayError::InvalidDatetime {
            row,
            value: raw.to_string(),
        })?;
        let values = (
            temp.get(row),
            umi.get(row),
            vento.get(row),
            rad.get(row),
            chuva.get(row),
        );
        let (Some(temperature), Some(humidity), Some(wind_speed), Some(radiation), Some(precipitation)) =
            values
        else {
            warn!("Skipping row {row} ({datetime}): missing values");
            continue;
        };
        readings.push(TimedReading {
            datetime,
            reading: WeatherReading {
                station_code: station_code.to_string(),
                temperature,
                humidity,
                pressure: STANDARD_PRESSURE,
                wind_speed,
                wind_direction: DEFAULT_WIND_DIRECTION,
                radiation,
                precipitation,
            },
        });
    }
    Ok(readings)
}

/// Loads a cleaned CSV with columns `datetime, Temp, Umi, Vento, Rad, Chuva`.
///
/// Rows with a missing measurement are skipped; an unparseable datetime fails the
/// whole file.
pub async fn load_readings(
    path: impl AsRef<Path>,
    station_code: &str,
) -> Result<Vec<TimedReading>, ReplayError> {
    let path = path.as_ref().to_path_buf();
    let station_code = station_code.to_string();
    let readings = task::spawn_blocking(move || {
        let df = read_frame(&path)?;
        frame_to_readings(&df, &station_code)
    })
    .await??;
    info!("Loaded {} readings for replay", readings.len());
    Ok(readings)
}

pub struct Replayer {
    api: ForecastClient,
    dashboard: Option<DashboardPublisher>,
    delay: Duration,
}

impl Replayer {
    pub fn new(api: ForecastClient, dashboard: Option<DashboardPublisher>, delay: Duration) -> Self {
        Self {
            api,
            dashboard,
            delay,
        }
    }

    pub fn from_config(config: &ReplayConfig) -> Result<Self, RelayError> {
        let dashboard = config
            .dashboard
            .as_ref()
            .map(|target| DashboardPublisher::new(target.telemetry_url(), config.request_timeout))
            .transpose()?;
        Ok(Self::new(
            ForecastClient::new(&config.api_url, config.request_timeout)?,
            dashboard,
            config.delay,
        ))
    }

    /// Sends every reading in order, waiting `delay` between rows.
    ///
    /// Rejected rows are logged and skipped. Losing the connection to the ingestion API
    /// ends the replay early; `cancel` does too.
    pub async fn run(&self, readings: &[TimedReading], cancel: CancellationToken) -> ReplaySummary {
        let mut summary = ReplaySummary {
            total: readings.len(),
            ..ReplaySummary::default()
        };

        for (i, timed) in readings.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let api_ok = match self.api.ingest(&timed.reading).await {
                Ok(_) => true,
                Err(e) if e.is_connection_failure() => {
                    warn!("Cannot reach ingestion API at {}, stopping: {e}", self.api.base_url());
                    break;
                }
                Err(e) => {
                    warn!("Row {} ({}) rejected: {e}", i + 1, timed.datetime);
                    false
                }
            };
            let dashboard_ok = match &self.dashboard {
                Some(dashboard) => match dashboard.publish(&timed.reading).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Row {} not published: {e}", i + 1);
                        false
                    }
                },
                None => false,
            };
            summary.ingested += usize::from(api_ok);
            summary.published += usize::from(dashboard_ok);
            info!(
                "[{}/{}] {} | Temp {:.1} °C | Umi {:.0}% | Vento {:.1} m/s | api: {} dashboard: {}",
                i + 1,
                summary.total,
                timed.datetime.format("%Y-%m-%d %H:%M"),
                timed.reading.temperature,
                timed.reading.humidity,
                timed.reading.wind_speed,
                api_ok,
                dashboard_ok
            );

            if i + 1 < readings.len() && !self.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        info!(
            "Replay finished: {}/{} ingested, {} published",
            summary.ingested, summary.total, summary.published
        );
        summary
    }
}
