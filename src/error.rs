//! Error types for the CFO helper

use thiserror::Error;

/// Result type alias for advisor and integration operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Integration Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("LLM request timed out after {0}s")]
    LlmTimeout(u64),

    #[error("Billing error: {0}")]
    BillingError(String),

    #[error("Data source error: {0}")]
    DataSourceError(String),

    // =============================
    // Boundary Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
