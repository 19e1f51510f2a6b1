//! Error types for engines, resources and the client.
//!
//! # Design
//! Every engine failure is terminal for its request and ends up as the
//! `"error"` message of a response envelope, so each variant carries the
//! human-readable message that will be shown to the caller. `kind()` lets
//! callers (and tests) branch on the category without matching on text.

use thiserror::Error;

/// Category of an `EngineError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Parse,
    NotFound,
    Validation,
    Serialization,
}

/// Errors produced while fetching or storing resource data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The backend could not be reached or failed mid-operation.
    #[error("{0}")]
    Connection(String),

    /// An identifier or request body could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// No record exists for the requested identifier.
    #[error("{0}")]
    NotFound(String),

    /// A document is missing a field the backend requires.
    #[error("{0}")]
    Validation(String),

    /// A value could not be converted to JSON.
    #[error("{0}")]
    Serialization(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Connection(_) => ErrorKind::Connection,
            EngineError::Parse(_) => ErrorKind::Parse,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// A base URL that cannot be used as a route key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,

    #[error("base url {0:?} must start with '/'")]
    RelativeBaseUrl(String),

    #[error("base url {0:?} contains a route pattern character")]
    PatternInBaseUrl(String),
}

/// Errors returned by `ResourceClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with an error envelope.
    #[error("resource error: {0}")]
    Envelope(String),

    /// The server returned a status the envelope contract does not produce.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
