use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report config input failed validation (missing email for email
    /// delivery, custom dates without a custom range, and so on).
    #[error("Invalid report config: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
