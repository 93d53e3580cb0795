//! Settings shared by the library and the binaries.
//!
//! Binaries fill these from flags and environment variables; tests build them directly.

use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

const DATA_DIR_NAME: &str = "station_forecast";
const MODEL_FILE_NAME: &str = "model.bin";
pub const DEFAULT_BUCKET: &str = "weather-raw-data";

/// Default artifact location: `<data dir>/station_forecast/model.bin`, falling back to
/// the working directory when the platform has no data directory.
pub fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .unwrap_or_default()
        .join(MODEL_FILE_NAME)
}

/// S3-compatible object storage holding the raw reading archive.
#[derive(Debug, Clone, Builder)]
pub struct ArchiveConfig {
    #[builder(into)]
    pub endpoint: String,
    #[builder(into)]
    pub access_key: String,
    #[builder(into)]
    pub secret_key: String,
    #[builder(into, default = DEFAULT_BUCKET.to_string())]
    pub bucket: String,
    #[builder(into, default = "us-east-1".to_string())]
    pub region: String,
    /// MinIO is usually reached over plain HTTP.
    #[builder(default = true)]
    pub allow_http: bool,
}

/// Where the relay reads forecasts from and publishes telemetry to.
#[derive(Debug, Clone, Builder)]
pub struct RelayConfig {
    #[builder(into)]
    pub api_url: String,
    #[builder(into)]
    pub dashboard_url: String,
    #[builder(into)]
    pub device_token: String,
    #[builder(default = Duration::from_secs(300))]
    pub interval: Duration,
    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,
}

impl RelayConfig {
    /// `POST` target for one device's telemetry.
    pub fn telemetry_url(&self) -> String {
        format!(
            "{}/api/v1/{}/telemetry",
            self.dashboard_url.trim_end_matches('/'),
            self.device_token
        )
    }
}

/// Replay of a cleaned station CSV into a running pipeline.
#[derive(Debug, Clone, Builder)]
pub struct ReplayConfig {
    #[builder(into)]
    pub csv_path: PathBuf,
    #[builder(into)]
    pub api_url: String,
    #[builder(into, default = "A301".to_string())]
    pub station_code: String,
    /// Publishing straight to the dashboard is skipped when unset.
    pub dashboard: Option<DashboardTarget>,
    #[builder(default = Duration::from_secs(5))]
    pub delay: Duration,
    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DashboardTarget {
    pub url: String,
    pub device_token: String,
}

impl DashboardTarget {
    pub fn telemetry_url(&self) -> String {
        format!(
            "{}/api/v1/{}/telemetry",
            self.url.trim_end_matches('/'),
            self.device_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_defaults_and_url() {
        let config = RelayConfig::builder()
            .api_url("http://localhost:8000")
            .dashboard_url("http://dashboard:8080/")
            .device_token("abc123")
            .build();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(
            config.telemetry_url(),
            "http://dashboard:8080/api/v1/abc123/telemetry"
        );
    }

    #[test]
    fn test_archive_defaults() {
        let config = ArchiveConfig::builder()
            .endpoint("http://localhost:9000")
            .access_key("minio")
            .secret_key("minio123")
            .build();
        assert_eq!(config.bucket, "weather-raw-data");
        assert_eq!(config.region, "us-east-1");
        assert!(config.allow_http);
    }

    #[test]
    fn test_default_model_path_ends_with_file_name() {
        let path = default_model_path();
        assert!(path.ends_with("station_forecast/model.bin") || path.ends_with("model.bin"));
    }
}
