pub mod api;
pub mod clock;
pub mod config;
mod error;
pub mod forecast;
pub mod ingest;
pub mod model;
pub mod relay;
pub mod replay;
pub mod store;
mod types;

#[cfg(test)]
mod test_support;

pub use error::PipelineError;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{default_model_path, ArchiveConfig, DashboardTarget, RelayConfig, ReplayConfig};

pub use types::observation::{NewObservation, Observation, WeatherReading};
pub use types::quantity::Quantity;

pub use model::artifact::{ModelArtifact, ModelMetrics};
pub use model::error::{ArtifactError, RegressorError};
pub use model::handle::{LoadedModel, ModelHandle};
pub use model::regressor::{Aggregation, Regressor, RegressionTree, TreeNode};

pub use forecast::error::{ForecastError, ReconstructError};
pub use forecast::features::FeatureVector;
pub use forecast::reconstructor::{cyclic_hour, FeatureReconstructor};
pub use forecast::service::{AutoForecast, ConfidenceInterval, ManualForecast, PredictionService};

pub use store::archive::RawArchive;
pub use store::error::{ArchiveError, StoreError};
pub use store::memory::MemoryObservationStore;
pub use store::postgres::PgObservationStore;
pub use store::ObservationStore;

pub use ingest::{IngestError, IngestReceipt, IngestService};

pub use api::error::ApiError;
pub use api::AppState;

pub use relay::client::ForecastClient;
pub use relay::error::RelayError;
pub use relay::publisher::DashboardPublisher;
pub use relay::telemetry::Telemetry;
pub use relay::{Relay, TickOutcome};

pub use replay::{load_readings, ReplayError, ReplaySummary, Replayer, TimedReading};
