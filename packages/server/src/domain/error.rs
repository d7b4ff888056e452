//! Domain errors.

use thiserror::Error;

use super::session::SessionState;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// History query validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    #[error("offset must be greater than or equal to 0 (got {0})")]
    NegativeOffset(i64),

    #[error("limit must be between {min} and {max} (got {got})")]
    LimitOutOfRange { got: i64, min: usize, max: usize },
}

/// Message log persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("message log serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("message log writer is no longer running")]
    WriterClosed,
}

/// Errors pushing a frame to one connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection {0} is closed")]
    ConnectionClosed(String),
}

/// Errors reading from the client transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to receive frame: {0}")]
    Receive(String),

    #[error("unexpected {0} frame")]
    UnexpectedFrame(&'static str),
}

/// Session lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {operation} while session is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },
}
