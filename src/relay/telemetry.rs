use crate::forecast::service::AutoForecast;
use crate::types::observation::Observation;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Flat telemetry object published to the dashboard after each forecast.
///
/// Keys on the wire are the ones the existing dashboard widgets are bound to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    #[serde(rename = "temperatura_atual")]
    pub current_temperature: f64,
    #[serde(rename = "temperatura_prevista")]
    pub predicted_temperature: f64,
    #[serde(rename = "erro_rmse")]
    pub rmse: f64,
    #[serde(rename = "erro_mae")]
    pub mae: f64,
    #[serde(rename = "r2_score")]
    pub r2: f64,
    /// RMSE in hundredths of a degree, easier to read on a gauge.
    #[serde(rename = "erro_rmse_centesimos")]
    pub rmse_hundredths: f64,
    #[serde(rename = "timestamp_previsao")]
    pub prediction_time: DateTime<Utc>,
    #[serde(rename = "diferenca_prevista", skip_serializing_if = "Option::is_none")]
    pub predicted_change: Option<f64>,
    #[serde(rename = "umidade", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(rename = "vento", skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "radiacao", skip_serializing_if = "Option::is_none")]
    pub radiation: Option<f64>,
    #[serde(rename = "precipitacao", skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Zero stands in for a metric that is missing or not a number.
fn metric(value: f64, decimals: i32) -> f64 {
    if value.is_finite() {
        round_to(value, decimals)
    } else {
        0.0
    }
}

fn present(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

impl Telemetry {
    /// Formats `forecast`, adding the weather context of `latest` when the history
    /// request succeeded.
    pub fn from_forecast(forecast: &AutoForecast, latest: Option<&Observation>) -> Self {
        let metrics = forecast.model_metrics;
        let current = forecast.current_temperature;
        let predicted = forecast.predicted_temperature;
        let finite = |v: f64| Some(v).filter(|v| v.is_finite());

        Self {
            current_temperature: current,
            predicted_temperature: predicted,
            rmse: metric(metrics.rmse, 4),
            mae: metric(metrics.mae, 4),
            r2: metric(metrics.r2, 4),
            rmse_hundredths: metric(metrics.rmse * 100.0, 2),
            prediction_time: forecast.prediction_time,
            predicted_change: (present(current) && present(predicted))
                .then(|| round_to(predicted - current, 2)),
            humidity: latest.and_then(|o| finite(o.humidity)),
            wind_speed: latest.and_then(|o| finite(o.wind_speed)),
            radiation: latest.and_then(|o| finite(o.radiation)),
            precipitation: latest.and_then(|o| finite(o.precipitation)),
        }
    }
}
