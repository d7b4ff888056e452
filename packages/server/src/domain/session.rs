//! Per-connection lifecycle states.

use serde::Serialize;

/// `Connecting -> Handshaking -> Active -> Closed`
///
/// `Closed` is reachable from every state; the other transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Handshaking,
    Active,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Handshaking)
                | (Self::Handshaking, Self::Active)
                | (Self::Connecting | Self::Handshaking | Self::Active, Self::Closed)
        )
    }
}
