use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No report config with the given id exists in the store.
    #[error("Report config not found: {id}")]
    ConfigNotFound { id: i64 },

    /// The cadence label is not one the resolver understands. The config
    /// stays unscheduled.
    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),

    #[error("Store error: {0}")]
    Store(#[from] adreport_store::StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] adreport_pipeline::PipelineError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
