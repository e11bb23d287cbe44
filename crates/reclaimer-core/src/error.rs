use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Other(String),
}

/// Stable, machine-readable error classification handed to callers of the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    DegenerateInputError,
    IoError,
    ConfigError,
    InternalError,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::ValidationError,
            Error::NotFound(_) => ErrorKind::NotFoundError,
            Error::DegenerateInput(_) => ErrorKind::DegenerateInputError,
            Error::Io(_) => ErrorKind::IoError,
            Error::Config(_) => ErrorKind::ConfigError,
            Error::Other(_) => ErrorKind::InternalError,
        }
    }
}

/// Serializable error body: `{ "kind": "...", "message": "..." }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        ErrorResponse {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
