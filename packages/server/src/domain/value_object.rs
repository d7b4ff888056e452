//! Value objects: connection identity and display names.

use std::{fmt, net::SocketAddr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Author used for join/leave notices.
pub const SYSTEM_AUTHOR: &str = "system";

/// Opaque identity of one live connection.
///
/// Generated server-side when a WebSocket is accepted; clients never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Name shown to other participants.
///
/// Always trimmed and non-empty. Not unique across connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a display name from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::EmptyDisplayName` if nothing is left after trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Pick the name for a freshly accepted connection.
    ///
    /// Uses the proposed name when it survives trimming, otherwise
    /// `user_<host>:<port>` from the peer address, otherwise
    /// `user_<connection id>`.
    pub fn negotiate(
        proposed: Option<&str>,
        peer: Option<SocketAddr>,
        connection_id: &ConnectionId,
    ) -> Self {
        if let Some(name) = proposed.and_then(|p| Self::new(p).ok()) {
            return name;
        }
        match peer {
            Some(addr) => Self(format!("user_{}:{}", addr.ip(), addr.port())),
            None => Self(format!("user_{}", connection_id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}
