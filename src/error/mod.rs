//! Error handling module for ClipScene

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ClipScene operations outside the domain layer
#[derive(Error, Debug)]
pub enum ClipSceneError {
    /// Domain error surfaced to the binary
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Output serialization error
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML output serialization error
    #[error("Failed to serialize output: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {message}")]
    LoggingInit { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for ClipScene operations
pub type ClipSceneResult<T> = std::result::Result<T, ClipSceneError>;
