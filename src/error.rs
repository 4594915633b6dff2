//! Error types for Herdsense

use thiserror::Error;

/// Errors that can occur during loading, training, or tracking
#[derive(Debug, Error)]
pub enum HerdError {
    #[error("Failed to parse tabular input: {0}")]
    Parse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Invalid coordinate input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
