/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
///
/// Per-record problems (a bad CSV row, a missing field) are NOT errors at
/// this level; they are counted in the run summary and the batch continues.
/// Only configuration and environment failures abort a run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Process spawn error: {0}")]
    ProcessSpawn(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-readable kind, used in run summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Pool(_) => "pool",
            AppError::Config(_) => "config",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Io(_) => "io",
            AppError::Serde(_) => "serde",
            AppError::Csv(_) => "csv",
            AppError::Delivery(_) => "delivery",
            AppError::ProcessSpawn(_) => "process_spawn",
            AppError::Internal(_) => "internal",
        }
    }
}
