use crate::forecast::error::ForecastError;
use crate::ingest::IngestError;
use crate::store::error::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use thiserror::Error;

/// Failure of one HTTP request, rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Observation history is unavailable")]
    History(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forecast(e) => match e {
                ForecastError::InsufficientHistory { .. } | ForecastError::MissingFeatures(_) => {
                    StatusCode::BAD_REQUEST
                }
                ForecastError::FeatureMismatch { .. } | ForecastError::PredictionFailed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ForecastError::ServiceUnavailable(_) | ForecastError::UpstreamUnavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
            ApiError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::History(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message plus the innermost cause, so 5xx details say what actually broke.
    fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = std::error::Error::source(self);
        let mut root = None;
        while let Some(cause) = source {
            root = Some(cause);
            source = std::error::Error::source(cause);
        }
        if let Some(cause) = root {
            detail.push_str(&format!(": {cause}"));
        }
        detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            error!("Request failed with {status}: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
