use crate::clock::{Clock, SystemClock};
use crate::forecast::error::ForecastError;
use crate::forecast::features::FeatureVector;
use crate::model::artifact::ModelMetrics;
use crate::model::handle::ModelHandle;
use crate::store::{chronological, ObservationStore};
use crate::types::nan_if_null;
use chrono::{DateTime, Timelike, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Next-hour forecast built from the stored observation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoForecast {
    #[serde(deserialize_with = "nan_if_null")]
    pub predicted_temperature: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub current_temperature: f64,
    pub prediction_time: DateTime<Utc>,
    /// Timestamp of the newest observation that went into the features.
    pub data_timestamp: DateTime<Utc>,
    pub model_metrics: ModelMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Forecast for caller-supplied features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualForecast {
    pub predicted_temperature: f64,
    pub prediction_time: DateTime<Utc>,
    pub rmse: f64,
    pub mae: f64,
    /// `prediction ± rmse`, only reported when the model has a positive RMSE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<ConfidenceInterval>,
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Answers forecast requests for one station.
///
/// # Examples
///
/// ```no_run
/// use station_forecast::{MemoryObservationStore, ModelHandle, PredictionService};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), station_forecast::ForecastError> {
/// let service = PredictionService::builder()
///     .model(Arc::new(ModelHandle::from_path("model.bin")))
///     .store(Arc::new(MemoryObservationStore::new()))
///     .station_code("A301")
///     .build();
/// let forecast = service.predict_auto().await?;
/// println!("Next hour: {:.2} °C", forecast.predicted_temperature);
/// # Ok(())
/// # }
/// ```
#[derive(bon::Builder)]
pub struct PredictionService {
    model: Arc<ModelHandle>,
    store: Arc<dyn ObservationStore>,
    #[builder(into)]
    station_code: String,
    #[builder(default = system_clock())]
    clock: Arc<dyn Clock>,
}

impl PredictionService {
    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn station_code(&self) -> &str {
        &self.station_code
    }

    /// Forecasts from the newest `max(lags) + 1` stored observations at the current
    /// UTC hour.
    pub async fn predict_auto(&self) -> Result<AutoForecast, ForecastError> {
        let model = self.model.get().await?;
        let reconstructor = model.reconstructor()?;
        let required = reconstructor.required_history();

        let window = chronological(
            self.store.as_ref(),
            Some(self.station_code.as_str()),
            required,
        )
        .await?;
        let latest = window
            .last()
            .ok_or(ForecastError::InsufficientHistory {
                required,
                available: 0,
            })?;

        let now = self.clock.now();
        let features = reconstructor.reconstruct(&window, now.hour())?;
        let predicted = model.artifact.regressor.predict(&features.values())?;
        debug!(
            "Forecast for {} from {} observations: {predicted:.3}",
            self.station_code,
            window.len()
        );

        Ok(AutoForecast {
            predicted_temperature: round2(predicted),
            current_temperature: round2(latest.temperature),
            prediction_time: now,
            data_timestamp: latest.timestamp,
            model_metrics: model.artifact.metrics,
        })
    }

    /// Forecasts from an explicit feature mapping. Every feature the model was trained
    /// on must be present; extra keys are ignored.
    pub async fn predict_manual(
        &self,
        values: &HashMap<String, f64>,
    ) -> Result<ManualForecast, ForecastError> {
        let model = self.model.get().await?;
        let features = FeatureVector::from_named(&model.artifact.feature_order, values)
            .map_err(ForecastError::MissingFeatures)?;
        let predicted = round2(model.artifact.regressor.predict(&features.values())?);
        let ModelMetrics { rmse, mae, .. } = model.artifact.metrics;

        Ok(ManualForecast {
            predicted_temperature: predicted,
            prediction_time: self.clock.now(),
            rmse,
            mae,
            confidence_interval: (rmse > 0.0).then(|| ConfidenceInterval {
                lower: predicted - rmse,
                upper: predicted + rmse,
            }),
        })
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
