use thiserror::Error;

/// Errors that can occur within the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No report config with the given id exists.
    #[error("Report config not found: {id}")]
    ConfigNotFound { id: i64 },

    /// No generated report with the given id exists.
    #[error("Generated report not found: {id}")]
    ReportNotFound { id: String },

    /// A stored value could not be mapped back to its domain type.
    #[error("Invalid stored value: {0}")]
    Invalid(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
