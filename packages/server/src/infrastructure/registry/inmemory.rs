//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap を `tokio::sync::Mutex` で保護し、ロックはマップ操作の間だけ保持します。
//! フレームの送信はロック解放後に呼び出し側（Broadcaster）が行います。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry, DisplayName};

struct Entry {
    connection: Connection,
    name: DisplayName,
}

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: ConnectionId, Value: 接続ハンドルと表示名
    entries: Mutex<HashMap<ConnectionId, Entry>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection: Connection, name: DisplayName) {
        let id = connection.id();
        let mut entries = self.entries.lock().await;
        if entries.insert(id, Entry { connection, name }).is_some() {
            tracing::warn!("Connection {} was already registered, overwriting", id);
        }
        tracing::debug!("Connection {} registered ({} live)", id, entries.len());
    }

    async fn unregister(&self, id: &ConnectionId) -> Option<DisplayName> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(id).map(|entry| entry.name);
        tracing::debug!(
            "Connection {} unregistered (was registered: {}, {} live)",
            id,
            removed.is_some(),
            entries.len()
        );
        removed
    }

    async fn snapshot(&self, excluding: Option<&ConnectionId>) -> Vec<Connection> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|(id, _)| Some(*id) != excluding)
            .map(|(_, entry)| entry.connection.clone())
            .collect()
    }

    async fn remove_all(&self, ids: &[ConnectionId]) {
        let mut entries = self.entries.lock().await;
        for id in ids {
            if let Some(entry) = entries.remove(id) {
                tracing::info!("Pruned connection {} ('{}')", id, entry.name);
            }
        }
    }
}
