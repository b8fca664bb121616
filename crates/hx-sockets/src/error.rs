//! Socket error types

use thiserror::Error;

/// Errors raised while registering handlers or driving a connection
#[derive(Debug, Error)]
pub enum SocketError {
    /// A handler is already bound to this trigger name
    #[error("Trigger already registered: {0}")]
    DuplicateTrigger(String),

    /// Inbound bytes are not a valid envelope
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope parsed but no handler matches its trigger
    #[error("No handler registered for trigger: {0}")]
    UnknownTrigger(String),

    /// The stream was closed by either side
    #[error("Connection closed")]
    ConnectionClosed,

    /// The underlying transport failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl SocketError {
    /// Get a stable error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateTrigger(_) => "DUPLICATE_TRIGGER",
            Self::MalformedEnvelope(_) => "MALFORMED_ENVELOPE",
            Self::UnknownTrigger(_) => "UNKNOWN_TRIGGER",
            Self::ConnectionClosed => "CONNECTION_CLOSED",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Create an I/O error from any displayable transport error
    pub fn io(err: impl std::fmt::Display) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SocketError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedEnvelope(err.to_string())
    }
}

/// Result type alias for socket operations
pub type SocketResult<T> = Result<T, SocketError>;
