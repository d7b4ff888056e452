//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// WebSocket connection could not be established or was lost
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// History request failed
    #[error("Failed to fetch history: {0}")]
    History(#[from] reqwest::Error),
}
