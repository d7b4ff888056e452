//! ConnectionRegistry trait 定義
//!
//! 接続中のクライアントと表示名の対応を管理するインターフェース。
//! 実装は Infrastructure 層（`InMemoryConnectionRegistry`）が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, DisplayName, MessagePushError};

/// Outbound frame channel for one connection.
///
/// The receiving end is drained by that connection's writer task; once the socket
/// write fails the receiver is dropped and every further push fails.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Handle to one live connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    channel: PusherChannel,
}

impl Connection {
    pub fn new(id: ConnectionId, channel: PusherChannel) -> Self {
        Self { id, channel }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue one text frame for this connection.
    ///
    /// # Errors
    ///
    /// Returns `MessagePushError::ConnectionClosed` once the writer side is gone.
    pub fn push(&self, text: &str) -> Result<(), MessagePushError> {
        self.channel
            .send(text.to_string())
            .map_err(|_| MessagePushError::ConnectionClosed(self.id.to_string()))
    }
}

/// Live connections and their display names.
///
/// Every operation takes the registry lock for the duration of the map operation
/// only; callers push frames after the lock is released.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Insert (or overwrite) the name for a connection.
    async fn register(&self, connection: Connection, name: DisplayName);

    /// Remove a connection, returning the name it was registered with.
    async fn unregister(&self, id: &ConnectionId) -> Option<DisplayName>;

    /// All registered connections except `excluding`.
    async fn snapshot(&self, excluding: Option<&ConnectionId>) -> Vec<Connection>;

    /// Remove every listed connection. Unknown ids are ignored.
    async fn remove_all(&self, ids: &[ConnectionId]);
}
