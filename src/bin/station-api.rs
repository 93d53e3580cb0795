//! HTTP service: ingests station readings and serves next-hour temperature forecasts.

use clap::Parser;
use log::{error, info, warn};
use station_forecast::{
    api, default_model_path, AppState, ArchiveConfig, IngestService, MemoryObservationStore,
    ModelHandle, ObservationStore, PgObservationStore, PipelineError, PredictionService,
    RawArchive,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "station-api", about = "Weather station ingestion and forecast API", version)]
struct Cli {
    /// PostgreSQL connection string for the observation table.
    #[arg(long, env = "DATABASE_URL", required_unless_present = "memory_store")]
    database_url: Option<String>,

    /// Keep observations in memory instead of PostgreSQL.
    #[arg(long)]
    memory_store: bool,

    /// S3-compatible endpoint of the raw archive. Archiving is off when unset.
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY", default_value = "")]
    aws_access_key: String,

    #[arg(long, env = "AWS_SECRET_KEY", default_value = "", hide_env_values = true)]
    aws_secret_key: String,

    #[arg(long, env = "S3_BUCKET", default_value = station_forecast::config::DEFAULT_BUCKET)]
    s3_bucket: String,

    /// Model artifact (`.bin` or `.json`). Defaults to the platform data directory.
    #[arg(long, env = "MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// Station whose history feeds automatic forecasts.
    #[arg(long, env = "STATION_CODE", default_value = "A301")]
    station_code: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind_addr: String,
}

async fn open_store(cli: &Cli) -> Result<Arc<dyn ObservationStore>, PipelineError> {
    match (&cli.database_url, cli.memory_store) {
        (Some(url), false) => {
            let store = PgObservationStore::connect(url).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        _ => {
            warn!("Using the in-memory observation store; nothing survives a restart");
            Ok(Arc::new(MemoryObservationStore::new()))
        }
    }
}

fn open_archive(cli: &Cli) -> Result<Option<RawArchive>, PipelineError> {
    let Some(endpoint) = &cli.s3_endpoint else {
        warn!("S3_ENDPOINT not set, raw readings will not be archived");
        return Ok(None);
    };
    let config = ArchiveConfig::builder()
        .endpoint(endpoint)
        .access_key(&cli.aws_access_key)
        .secret_key(&cli.aws_secret_key)
        .bucket(&cli.s3_bucket)
        .build();
    Ok(Some(RawArchive::from_config(&config)?))
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let store = open_store(&cli).await?;
    let archive = open_archive(&cli)?;
    if let Some(archive) = &archive {
        if let Err(e) = archive.check().await {
            error!(
                "Bucket '{}' is not usable, ingested readings will not be archived until it exists: {e}",
                cli.s3_bucket
            );
        }
    }

    let model_path = cli.model_path.clone().unwrap_or_else(default_model_path);
    let model = Arc::new(ModelHandle::from_path(&model_path));
    if let Err(e) = model.get().await {
        warn!(
            "Model not loaded from {}, forecasts return 503 until it is: {e}",
            model_path.display()
        );
    }

    let state = AppState {
        forecasts: Arc::new(
            PredictionService::builder()
                .model(model)
                .store(store.clone())
                .station_code(cli.station_code.clone())
                .build(),
        ),
        ingest: Arc::new(
            IngestService::builder()
                .store(store.clone())
                .maybe_archive(archive)
                .build(),
        ),
        store,
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
                cancel.cancel();
            }
        }
    });

    let listener = TcpListener::bind(&cli.bind_addr)
        .await
        .map_err(|e| PipelineError::Bind(cli.bind_addr.clone(), e))?;
    api::serve(listener, state, cancel)
        .await
        .map_err(PipelineError::Serve)
}
