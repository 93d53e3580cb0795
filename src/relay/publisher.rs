use crate::relay::client::{build_http_client, send_checked};
use crate::relay::error::RelayError;
use serde::Serialize;
use std::time::Duration;

/// Device telemetry endpoint of the dashboard, `POST <url>/api/v1/<token>/telemetry`.
#[derive(Debug, Clone)]
pub struct DashboardPublisher {
    http: reqwest::Client,
    telemetry_url: String,
}

impl DashboardPublisher {
    pub fn new(telemetry_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            telemetry_url: telemetry_url.into(),
        })
    }

    /// Posts one flat JSON object.
    pub async fn publish<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), RelayError> {
        send_checked(self.http.post(&self.telemetry_url).json(payload), &self.telemetry_url)
            .await
            .map(|_| ())
    }
}
