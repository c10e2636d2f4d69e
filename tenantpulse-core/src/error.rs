//! Error types for tenantpulse-core

use thiserror::Error;

/// Main error type for the tenantpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Not enough companies to derive a cross-company statistic
    #[error("insufficient data for benchmarking {metric}: no companies in scope")]
    InsufficientData { metric: String },

    /// Company filter did not match any company in the snapshot
    #[error("company not found: {0}")]
    CompanyNotFound(String),
}

/// Result type alias for tenantpulse-core
pub type Result<T> = std::result::Result<T, Error>;
