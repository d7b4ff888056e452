//! UseCase: 永続化してから全接続へ配信する
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - Broadcaster::broadcast() メソッド
//! - 永続化 → snapshot → 配信 → 失敗した接続の削除 の流れ
//!
//! ### なぜこのテストが必要か
//! - 永続化の失敗が配信を止めないこと（best effort live / best effort durable）
//! - 送信に失敗した接続がレジストリから取り除かれることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：全員への配信とログへの追記
//! - 除外指定：omit した接続には送らない
//! - 異常系：ストア障害、切断済みの接続

use std::sync::Arc;

use charla_shared::time::Clock;

use crate::domain::{
    ChatRecord, ConnectionId, ConnectionRegistry, DisplayName, MessageStore,
};

/// Outcome of one broadcast, mostly for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub record: ChatRecord,
    /// `false` when the store rejected the record; delivery still happened
    pub persisted: bool,
    pub delivered: Vec<ConnectionId>,
    /// Connections whose push failed and were removed from the registry
    pub pruned: Vec<ConnectionId>,
}

/// Persists a chat line then fans it out to every registered connection.
pub struct Broadcaster {
    store: Arc<dyn MessageStore>,
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl Broadcaster {
    pub fn new(
        store: Arc<dyn MessageStore>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
        }
    }

    /// Persist `text` and push it to every connection except `omit`.
    ///
    /// `author = None` records a system notice. A store failure is logged and
    /// does not prevent delivery. Connections whose push fails are pruned without
    /// a leave notice.
    pub async fn broadcast(
        &self,
        text: impl Into<String>,
        author: Option<&DisplayName>,
        omit: Option<&ConnectionId>,
    ) -> BroadcastReport {
        let record = ChatRecord::new(
            text,
            author.map(DisplayName::as_str),
            self.clock.now_utc(),
        );

        let persisted = match self.store.append(record.clone()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist message, delivering anyway: {}", e);
                false
            }
        };

        let targets = self.registry.snapshot(omit).await;

        let mut delivered = Vec::with_capacity(targets.len());
        let mut pruned = Vec::new();
        for target in targets {
            match target.push(&record.text) {
                Ok(()) => delivered.push(target.id()),
                Err(e) => {
                    tracing::warn!("Dropping connection: {}", e);
                    pruned.push(target.id());
                }
            }
        }

        if !pruned.is_empty() {
            self.registry.remove_all(&pruned).await;
        }

        tracing::debug!(
            "Broadcasted {:?} from '{}' to {} connection(s), pruned {}",
            record.text,
            record.author,
            delivered.len(),
            pruned.len()
        );

        BroadcastReport {
            record,
            persisted,
            delivered,
            pruned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, StoreError, repository::MockMessageStore},
        infrastructure::{registry::InMemoryConnectionRegistry, store::JsonFileMessageStore},
    };
    use charla_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn fixed_clock() -> Arc<dyn Clock> {
        // 2023-01-01 00:00:00 UTC
        Arc::new(FixedClock::from_millis(1_672_531_200_000))
    }

    fn create_file_store() -> (tempfile::TempDir, Arc<JsonFileMessageStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileMessageStore::new(dir.path().join("chat.json")));
        (dir, store)
    }

    async fn connect(
        registry: &InMemoryConnectionRegistry,
        name: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::generate();
        registry
            .register(Connection::new(id, tx), DisplayName::new(name).unwrap())
            .await;
        (id, rx)
    }

    #[tokio::test]
    async fn test_broadcast_persists_and_delivers_to_everyone() {
        // テスト項目: 全接続に配信され、ログに 1 件追記される
        // given (前提条件):
        let (_dir, store) = create_file_store();
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (_alice, mut alice_rx) = connect(&registry, "alice").await;
        let (_bob, mut bob_rx) = connect(&registry, "bob").await;
        let broadcaster = Broadcaster::new(store.clone(), registry.clone(), fixed_clock());
        let alice_name = DisplayName::new("alice").unwrap();

        // when (操作):
        let report = broadcaster
            .broadcast("[alice] hola", Some(&alice_name), None)
            .await;

        // then (期待する結果):
        assert!(report.persisted);
        assert_eq!(report.delivered.len(), 2);
        assert!(report.pruned.is_empty());
        assert_eq!(alice_rx.recv().await, Some("[alice] hola".to_string()));
        assert_eq!(bob_rx.recv().await, Some("[alice] hola".to_string()));

        let log = store.load().await.unwrap();
        assert_eq!(
            log,
            vec![ChatRecord {
                text: "[alice] hola".to_string(),
                author: "alice".to_string(),
                ts: "2023-01-01T00:00:00.000000+00:00".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_broadcast_without_author_is_system_notice() {
        // テスト項目: author 未指定の場合は system として記録される
        // given (前提条件):
        let (_dir, store) = create_file_store();
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let broadcaster = Broadcaster::new(store.clone(), registry, fixed_clock());

        // when (操作):
        let report = broadcaster
            .broadcast("🟢 alice se unió al chat", None, None)
            .await;

        // then (期待する結果):
        assert_eq!(report.record.author, "system");
        assert!(report.delivered.is_empty());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_skips_omitted_connection() {
        // テスト項目: omit 指定した接続には配信されない
        // given (前提条件):
        let (_dir, store) = create_file_store();
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (alice, mut alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;
        let broadcaster = Broadcaster::new(store, registry, fixed_clock());

        // when (操作):
        let report = broadcaster
            .broadcast("🔴 alice salió del chat", None, Some(&alice))
            .await;

        // then (期待する結果):
        assert_eq!(report.delivered, vec![bob]);
        assert_eq!(
            bob_rx.recv().await,
            Some("🔴 alice salió del chat".to_string())
        );
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_delivers_even_when_store_fails() {
        // テスト項目: 永続化に失敗しても配信は行われる
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(StoreError::Io(std::io::Error::other("disk full"))));
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (_alice, mut alice_rx) = connect(&registry, "alice").await;
        let broadcaster = Broadcaster::new(Arc::new(store), registry, fixed_clock());

        // when (操作):
        let report = broadcaster.broadcast("[alice] hola", None, None).await;

        // then (期待する結果):
        assert!(!report.persisted);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(alice_rx.recv().await, Some("[alice] hola".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_prunes_dead_connections() {
        // テスト項目: 送信に失敗した接続はレジストリから削除される（退出通知なし）
        // given (前提条件):
        let (_dir, store) = create_file_store();
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (alice, alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;
        drop(alice_rx); // alice の書き込みタスクが終了した状態
        let broadcaster = Broadcaster::new(store.clone(), registry.clone(), fixed_clock());

        // when (操作):
        let report = broadcaster.broadcast("[bob] hola", None, None).await;

        // then (期待する結果):
        assert_eq!(report.pruned, vec![alice]);
        assert_eq!(report.delivered, vec![bob]);
        assert_eq!(bob_rx.recv().await, Some("[bob] hola".to_string()));
        assert!(bob_rx.try_recv().is_err());

        let remaining: Vec<ConnectionId> =
            registry.snapshot(None).await.iter().map(|c| c.id()).collect();
        assert_eq!(remaining, vec![bob]);
        assert_eq!(registry.unregister(&alice).await, None);
        assert_eq!(store.load().await.unwrap().len(), 1);
    }
}
