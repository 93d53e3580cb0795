use crate::forecast::service::AutoForecast;
use crate::ingest::IngestReceipt;
use crate::relay::error::RelayError;
use crate::types::observation::{Observation, WeatherReading};
use log::warn;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(RelayError::ClientBuild)
}

/// Sends `request` and turns transport failures and non-2xx answers into errors.
pub(crate) async fn send_checked(
    request: RequestBuilder,
    url: &str,
) -> Result<Response, RelayError> {
    let response = request
        .send()
        .await
        .map_err(|e| RelayError::NetworkRequest(url.to_string(), e))?;

    match response.error_for_status() {
        Ok(resp) => Ok(resp),
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            Err(if let Some(status) = e.status() {
                RelayError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                RelayError::NetworkRequest(url.to_string(), e)
            })
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, RelayError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RelayError::Decode(url.to_string(), e))
}

/// Client for the station API.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn auto_forecast(&self) -> Result<AutoForecast, RelayError> {
        let url = format!("{}/predict/auto", self.base_url);
        let response = send_checked(self.http.get(&url), &url).await?;
        read_json(response, &url).await
    }

    /// Newest `limit` observations, oldest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<Observation>, RelayError> {
        let url = format!("{}/data/history", self.base_url);
        let request = self.http.get(&url).query(&[("limit", limit)]);
        let response = send_checked(request, &url).await?;
        read_json(response, &url).await
    }

    pub async fn ingest(&self, reading: &WeatherReading) -> Result<IngestReceipt, RelayError> {
        let url = format!("{}/ingest", self.base_url);
        let response = send_checked(self.http.post(&url).json(reading), &url).await?;
        read_json(response, &url).await
    }
}
