//! Publishes the station API's automatic forecast to a dashboard device on a fixed
//! interval.

use clap::Parser;
use log::info;
use station_forecast::{PipelineError, Relay, RelayConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "forecast-relay", about = "Relay forecasts to a dashboard device", version)]
struct Cli {
    #[arg(long, env = "API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[arg(long, env = "DASHBOARD_URL", default_value = "http://localhost:9090")]
    dashboard_url: String,

    /// Access token of the dashboard device receiving the telemetry.
    #[arg(long, env = "DEVICE_TOKEN", hide_env_values = true)]
    device_token: String,

    #[arg(long, env = "RELAY_INTERVAL_SECS", default_value_t = 30)]
    interval_secs: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = RelayConfig::builder()
        .api_url(cli.api_url)
        .dashboard_url(cli.dashboard_url)
        .device_token(cli.device_token)
        .interval(Duration::from_secs(cli.interval_secs))
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .build();
    let relay = Relay::from_config(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Stopping relay");
                cancel.cancel();
            }
        }
    });

    relay.run(cancel).await;
    Ok(())
}
