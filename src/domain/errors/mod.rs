// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input rejected before any network call (timecodes, URLs, empty clip lists)
    Validation(String),
    /// Non-2xx response or network failure talking to the processing service
    ///
    /// Displays the service's detail only; the status is kept for callers and logs.
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// The service reported the job as failed; the message is shown verbatim
    RemoteJob(String),
    /// A polling loop for this job id is already running
    PollInProgress(String),
    /// The polling loop for this job id was cancelled
    Cancelled(String),
    /// Referenced entity does not exist
    NotFound(String),
    /// Configuration could not be loaded or is invalid
    Config(String),
    /// Internal error
    Internal(String),
}

impl DomainError {
    /// Build a transport error without an HTTP status (connection refused, timeouts, ...)
    pub fn network(message: impl Into<String>) -> Self {
        DomainError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Build a transport error for a non-2xx response
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        DomainError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DomainError::Transport { .. })
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::Transport { message, .. } => write!(f, "{}", message),
            DomainError::RemoteJob(msg) => write!(f, "{}", msg),
            DomainError::PollInProgress(id) => {
                write!(f, "Job {} is already being polled", id)
            }
            DomainError::Cancelled(id) => write!(f, "Polling for job {} was cancelled", id),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
