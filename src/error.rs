//! Error types for query execution, configuration and answer comparison

use thiserror::Error;

/// Result type alias for rdfgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rdfgate
///
/// Per-query failures (`MalformedQuery`, `Transport`, `ResponseFormat`, `Store`,
/// `Cancelled`) are absorbed by [`crate::execution::TimedExecution`] and only ever
/// surface as an [`crate::execution::Outcome`]. `ContractViolation` is returned to
/// callers of the comparison functions because it signals a caller bug.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend rejected the query text
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Network or backend connection failure
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The backend answered with a body that could not be decoded
    #[error("Response format error: {0}")]
    ResponseFormat(String),

    /// Store-side evaluation or storage failure
    #[error("Store error: {0}")]
    Store(String),

    /// The execution resource was closed while the query was running
    #[error("Query cancelled")]
    Cancelled,

    /// A result passed to the comparison logic has an unsupported shape
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ResponseFormat(err.to_string())
    }
}
