//! Replays a cleaned station CSV into the ingestion API, and optionally straight to the
//! dashboard, one row at a time.

use clap::Parser;
use log::{info, warn};
use station_forecast::{load_readings, DashboardTarget, PipelineError, ReplayConfig, Replayer};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "station-replay", about = "Replay a cleaned station CSV", version)]
struct Cli {
    /// Cleaned CSV with columns datetime, Temp, Umi, Vento, Rad, Chuva.
    csv_path: PathBuf,

    #[arg(long, env = "API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[arg(long, env = "STATION_CODE", default_value = "A301")]
    station_code: String,

    /// Also post every reading to this dashboard. Requires --device-token.
    #[arg(long, env = "DASHBOARD_URL", requires = "device_token")]
    dashboard_url: Option<String>,

    #[arg(long, env = "DEVICE_TOKEN", hide_env_values = true)]
    device_token: Option<String>,

    /// Pause between rows, in milliseconds.
    #[arg(long, env = "REPLAY_DELAY_MS", default_value_t = 500)]
    delay_ms: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let dashboard = cli
        .dashboard_url
        .zip(cli.device_token)
        .map(|(url, device_token)| DashboardTarget { url, device_token });
    let config = ReplayConfig::builder()
        .csv_path(cli.csv_path)
        .api_url(cli.api_url)
        .station_code(cli.station_code)
        .maybe_dashboard(dashboard)
        .delay(Duration::from_millis(cli.delay_ms))
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .build();

    let readings = load_readings(&config.csv_path, &config.station_code).await?;
    if let (Some(first), Some(last)) = (readings.first(), readings.last()) {
        info!("Replaying {} to {}", first.datetime, last.datetime);
    }
    let replayer = Replayer::from_config(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let summary = replayer.run(&readings, cancel).await;
    if summary.ingested < summary.total {
        warn!(
            "Only {} of {} readings were ingested",
            summary.ingested, summary.total
        );
    }
    Ok(())
}
