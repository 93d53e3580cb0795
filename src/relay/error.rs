use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response body from {0}")]
    Decode(String, #[source] reqwest::Error),
}

impl RelayError {
    /// The peer could not be reached at all, as opposed to answering with an error.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            RelayError::NetworkRequest(_, e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
