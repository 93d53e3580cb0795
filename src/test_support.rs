//! Shared fixtures for unit tests.

use crate::model::artifact::{ModelArtifact, ModelMetrics};
use crate::model::regressor::Regressor;
use crate::types::observation::{Observation, WeatherReading};
use crate::types::quantity::Quantity;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const STANDARD_LAGS: [u32; 6] = [1, 2, 3, 6, 12, 24];
pub const STATION: &str = "A301";

/// Feature order as the training pipeline writes it: every quantity per lag, then the
/// cyclic hour pair.
pub fn standard_feature_order(lags: &[u32]) -> Vec<String> {
    let mut order: Vec<String> = lags
        .iter()
        .flat_map(|lag| Quantity::ALL.into_iter().map(move |q| q.lag_feature_name(*lag)))
        .collect();
    order.push("hour_sin".to_string());
    order.push("hour_cos".to_string());
    order
}

/// Predicts `Temp_lag_1 + 0.5`, so expected forecasts are easy to compute by hand.
pub fn persistence_artifact(lags: &[u32], rmse: f64) -> ModelArtifact {
    let feature_order = standard_feature_order(lags);
    let coefficients = feature_order
        .iter()
        .map(|name| if name == "Temp_lag_1" { 1.0 } else { 0.0 })
        .collect();
    ModelArtifact {
        regressor: Regressor::Linear {
            coefficients,
            intercept: 0.5,
        },
        feature_order,
        lags: lags.to_vec(),
        metrics: ModelMetrics {
            rmse,
            mae: rmse * 0.8,
            r2: 0.97,
        },
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
}

pub fn reading(temperature: f64) -> WeatherReading {
    WeatherReading {
        station_code: STATION.to_string(),
        temperature,
        humidity: 70.0 + temperature / 10.0,
        pressure: 1013.25,
        wind_speed: 2.0,
        wind_direction: 0.0,
        radiation: 1000.0 + temperature,
        precipitation: 0.0,
    }
}

/// One observation per hour, oldest first, with the given temperatures.
pub fn hourly_window(temperatures: &[f64]) -> Vec<Observation> {
    temperatures
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let at = start_time() + Duration::hours(i as i64);
            Observation::from_new(i as i64 + 1, reading(*t).received_at(at))
        })
        .collect()
}
