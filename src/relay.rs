//! Periodically pulls the automatic forecast from the station API and republishes it
//! as dashboard telemetry.

pub mod client;
pub mod error;
pub mod publisher;
pub mod telemetry;

use crate::config::RelayConfig;
use crate::relay::client::ForecastClient;
use crate::relay::error::RelayError;
use crate::relay::publisher::DashboardPublisher;
use crate::relay::telemetry::Telemetry;
use log::{error, info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published,
    /// The forecast could not be fetched; nothing was sent.
    NoForecast,
    PublishFailed,
}

pub struct Relay {
    client: ForecastClient,
    publisher: DashboardPublisher,
    interval: Duration,
}

impl Relay {
    pub fn new(client: ForecastClient, publisher: DashboardPublisher, interval: Duration) -> Self {
        Self {
            client,
            publisher,
            interval,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        Ok(Self::new(
            ForecastClient::new(&config.api_url, config.request_timeout)?,
            DashboardPublisher::new(config.telemetry_url(), config.request_timeout)?,
            config.interval,
        ))
    }

    /// One fetch, format and publish cycle. Failures are logged, never retried here.
    pub async fn tick(&self) -> TickOutcome {
        let forecast = match self.client.auto_forecast().await {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("Skipping tick, no forecast available: {e}");
                return TickOutcome::NoForecast;
            }
        };
        let latest = match self.client.history(1).await {
            Ok(rows) => rows.into_iter().last(),
            Err(e) => {
                warn!("Publishing without weather context: {e}");
                None
            }
        };

        let telemetry = Telemetry::from_forecast(&forecast, latest.as_ref());
        match self.publisher.publish(&telemetry).await {
            Ok(()) => {
                info!(
                    "Published forecast: current {:.1} °C, next hour {:.1} °C",
                    telemetry.current_temperature, telemetry.predicted_temperature
                );
                TickOutcome::Published
            }
            Err(e) => {
                error!("Failed to publish telemetry: {e}");
                TickOutcome::PublishFailed
            }
        }
    }

    /// Ticks on a fixed interval until `cancel` fires and returns the number of ticks.
    ///
    /// A tick always runs to completion; cancellation is observed between ticks and
    /// while sleeping.
    pub async fn run(&self, cancel: CancellationToken) -> usize {
        info!(
            "Relaying forecasts from {} every {:?}",
            self.client.base_url(),
            self.interval
        );
        let mut ticks = 0;
        while !cancel.is_cancelled() {
            self.tick().await;
            ticks += 1;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!("Relay stopped after {ticks} ticks");
        ticks
    }
}
