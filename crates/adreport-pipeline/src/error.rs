use thiserror::Error;

/// Errors from a single pipeline execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The config could not be turned into an outgoing API request.
    #[error("Invalid report request: {0}")]
    Translate(String),

    /// Network failure, non-2xx status, or a malformed analytics response.
    #[error("Analytics fetch failed: {0}")]
    Fetch(String),

    /// The summarizer returned an error or produced no text.
    #[error("Summarization failed: {0}")]
    Summarize(String),

    /// Email delivery failure. Logged by the pipeline, never fatal once a
    /// report is persisted.
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("Store error: {0}")]
    Store(#[from] adreport_store::StoreError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
