//! HTTP boundary of the pipeline: ingestion, forecasts, history and health.

pub mod error;

use crate::api::error::ApiError;
use crate::forecast::service::{AutoForecast, ManualForecast, PredictionService};
use crate::ingest::{IngestReceipt, IngestService};
use crate::store::{chronological, ObservationStore};
use crate::types::observation::{Observation, WeatherReading};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 1000;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub forecasts: Arc<PredictionService>,
    pub ingest: Arc<IngestService>,
    pub store: Arc<dyn ObservationStore>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub station: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/predict/auto", get(predict_auto))
        .route("/predict", post(predict_manual))
        .route("/data/history", get(history))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Station API listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

async fn ingest(
    State(state): State<AppState>,
    body: Result<Json<WeatherReading>, JsonRejection>,
) -> Result<Json<IngestReceipt>, ApiError> {
    let Json(reading) = body.map_err(bad_body)?;
    Ok(Json(state.ingest.ingest(reading).await?))
}

async fn predict_auto(State(state): State<AppState>) -> Result<Json<AutoForecast>, ApiError> {
    Ok(Json(state.forecasts.predict_auto().await?))
}

async fn predict_manual(
    State(state): State<AppState>,
    body: Result<Json<HashMap<String, f64>>, JsonRejection>,
) -> Result<Json<ManualForecast>, ApiError> {
    let Json(features) = body.map_err(bad_body)?;
    Ok(Json(state.forecasts.predict_manual(&features).await?))
}

async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}, got {limit}"
        )));
    }
    let rows = chronological(state.store.as_ref(), query.station.as_deref(), limit).await?;
    Ok(Json(rows))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        model_loaded: state.forecasts.model().is_loaded(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::handle::ModelHandle;
    use crate::store::memory::MemoryObservationStore;
    use crate::test_support::{
        persistence_artifact, reading, standard_feature_order, start_time, STANDARD_LAGS,
        STATION,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use serde_json::Value;
    use tower::ServiceExt;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn app_with(model: ModelHandle) -> (Router, Arc<MemoryObservationStore>) {
        let store = Arc::new(MemoryObservationStore::new());
        let clock = Arc::new(FixedClock(start_time() + Duration::hours(30)));
        let state = AppState {
            forecasts: Arc::new(
                PredictionService::builder()
                    .model(Arc::new(model))
                    .store(store.clone())
                    .station_code(STATION)
                    .clock(clock.clone())
                    .build(),
            ),
            ingest: Arc::new(
                IngestService::builder()
                    .store(store.clone())
                    .clock(clock)
                    .build(),
            ),
            store: store.clone(),
        };
        (router(state), store)
    }

    fn app() -> (Router, Arc<MemoryObservationStore>) {
        app_with(ModelHandle::preloaded(persistence_artifact(
            &STANDARD_LAGS,
            0.11,
        )))
    }

    async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        let response = app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &impl Serialize) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_then_history() -> TestResult {
        let (app, _) = app();
        let (status, receipt) = send(&app, post_json("/ingest", &reading(24.5))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["status"], "received");
        assert_eq!(receipt["persisted"], true);
        assert_eq!(receipt["archived"], false);

        let (status, rows) = send(&app, get("/data/history?limit=10")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().map(Vec::len), Some(1));
        assert_eq!(rows[0]["temperature"], 24.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_rejects_incomplete_body() -> TestResult {
        let (app, store) = app();
        let body = serde_json::json!({ "station_code": "A301", "temperature": 20.0 });
        let (status, error) = send(&app, post_json("/ingest", &body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["detail"].is_string());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_forecast_needs_history() -> TestResult {
        let (app, _) = app();
        for i in 0..3 {
            send(&app, post_json("/ingest", &reading(20.0 + i as f64))).await?;
        }
        let (status, error) = send(&app, get("/predict/auto")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            error["detail"],
            "Insufficient history: 25 observations required, 3 available"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_forecast_from_ingested_history() -> TestResult {
        let (app, store) = app();
        for hour in 0..25 {
            let obs = reading(20.0 + hour as f64 * 0.1)
                .received_at(start_time() + Duration::hours(hour));
            store.insert(obs).await?;
        }
        let (status, forecast) = send(&app, get("/predict/auto")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(forecast["predicted_temperature"], 22.8);
        assert_eq!(forecast["current_temperature"], 22.4);
        assert_eq!(forecast["model_metrics"]["rmse"], 0.11);
        Ok(())
    }

    #[tokio::test]
    async fn test_manual_forecast() -> TestResult {
        let (app, _) = app();
        let mut features: HashMap<String, f64> = standard_feature_order(&STANDARD_LAGS)
            .into_iter()
            .map(|name| (name, 10.0))
            .collect();
        let (status, forecast) = send(&app, post_json("/predict", &features)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(forecast["predicted_temperature"], 10.5);
        assert_eq!(forecast["confidence_interval"]["lower"].as_f64(), Some(10.5 - 0.11));
        assert_eq!(forecast["confidence_interval"]["upper"].as_f64(), Some(10.5 + 0.11));

        features.remove("hour_cos");
        let (status, error) = send(&app, post_json("/predict", &features)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["detail"], "Missing required features: hour_cos");
        Ok(())
    }

    #[tokio::test]
    async fn test_history_limit_bounds() -> TestResult {
        let (app, _) = app();
        for uri in ["/data/history?limit=0", "/data/history?limit=1001", "/data/history?limit=x"] {
            let (status, error) = send(&app, get(uri)).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(error["detail"].is_string());
        }
        let (status, rows) = send(&app, get("/data/history")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows, serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_health_and_missing_model() -> TestResult {
        let (missing, _) = app_with(ModelHandle::from_path("/nonexistent/model.bin"));
        let (status, health) = send(&missing, get("/health")).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["model_loaded"], false);
        assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));

        let (status, _) = send(&missing, get("/predict/auto")).await?;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (loaded, _) = app();
        let (_, health) = send(&loaded, get("/health")).await?;
        assert_eq!(health["model_loaded"], true);
        Ok(())
    }
}
