//! Error types for the daybook ecosystem.

use thiserror::Error;

/// Errors that can occur in daybook operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unrecognized action: {0}")]
    UnrecognizedAction(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Expected a JSON response, got '{0}'")]
    UnexpectedContentType(String),

    #[error("Holiday calendar for region '{0}' could not be loaded: {1}")]
    HolidaySource(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Result type alias for daybook operations.
pub type CoreResult<T> = Result<T, CoreError>;
