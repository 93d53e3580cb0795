use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to database")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to prepare table '{table}'")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database query failed")]
    Query(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to configure object store for bucket '{bucket}'")]
    Configure {
        bucket: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to serialize reading for '{0}'")]
    Serialize(String, #[source] serde_json::Error),

    #[error("Object store is unreachable or the bucket does not exist")]
    Unreachable(#[source] object_store::Error),

    #[error("Failed to write object '{key}'")]
    Write {
        key: String,
        #[source]
        source: object_store::Error,
    },
}
