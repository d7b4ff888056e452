//! 単一ライタータスクによる MessageStore
//!
//! 内側のストアは専用タスクだけが触ります。呼び出し側はコマンドを `mpsc` で送り、
//! 結果を `oneshot` で受け取ります。キューに溜まった連続する append は
//! 1 回の読み込み・書き込みサイクルにまとめて処理されます。
//!
//! これにより、並行する append の読み込みと書き込みが交差して片方が失われる
//! 問題（lost update）が起きません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{ChatRecord, MessageStore, StoreError};

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum Command {
    EnsureInitialized(Reply<()>),
    Load(Reply<Vec<ChatRecord>>),
    Append(ChatRecord, Reply<()>),
    Save(Vec<ChatRecord>, Reply<()>),
}

/// MessageStore front-end that serializes every operation through one writer task.
#[derive(Clone)]
pub struct QueuedMessageStore {
    commands: mpsc::UnboundedSender<Command>,
}

impl QueuedMessageStore {
    /// Spawn the writer task owning `inner`. Must be called inside a tokio runtime.
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(inner: Arc<dyn MessageStore>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_loop(inner, rx));
        Self { commands }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| StoreError::WriterClosed)?;
        response.await.map_err(|_| StoreError::WriterClosed)?
    }
}

#[async_trait]
impl MessageStore for QueuedMessageStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        self.request(Command::EnsureInitialized).await
    }

    async fn load(&self) -> Result<Vec<ChatRecord>, StoreError> {
        self.request(Command::Load).await
    }

    async fn append(&self, record: ChatRecord) -> Result<(), StoreError> {
        self.request(|reply| Command::Append(record, reply)).await
    }

    async fn save(&self, records: &[ChatRecord]) -> Result<(), StoreError> {
        let records = records.to_vec();
        self.request(|reply| Command::Save(records, reply)).await
    }
}

async fn writer_loop(inner: Arc<dyn MessageStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut pending = None;

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match rx.recv().await {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::EnsureInitialized(reply) => {
                let _ = reply.send(inner.ensure_initialized().await);
            }
            Command::Load(reply) => {
                let _ = reply.send(inner.load().await);
            }
            Command::Save(records, reply) => {
                let _ = reply.send(inner.save(&records).await);
            }
            Command::Append(record, reply) => {
                let mut batch = vec![(record, reply)];
                // Coalesce appends already waiting; stop at the first other command
                while let Ok(next) = rx.try_recv() {
                    match next {
                        Command::Append(record, reply) => batch.push((record, reply)),
                        other => {
                            pending = Some(other);
                            break;
                        }
                    }
                }
                append_batch(inner.as_ref(), batch).await;
            }
        }
    }

    tracing::debug!("Message log writer stopped");
}

async fn append_batch(inner: &dyn MessageStore, batch: Vec<(ChatRecord, Reply<()>)>) {
    let batch = match <[_; 1]>::try_from(batch) {
        Ok([(record, reply)]) => {
            let _ = reply.send(inner.append(record).await);
            return;
        }
        Err(batch) => batch,
    };

    tracing::debug!("Coalescing {} appends into one write", batch.len());
    let (records, replies): (Vec<_>, Vec<_>) = batch.into_iter().unzip();
    let result = match inner.load().await {
        Ok(mut log) => {
            log.extend(records);
            inner.save(&log).await
        }
        Err(e) => Err(e),
    };

    // StoreError is not Clone; every waiter gets its own copy of the outcome
    let failure = result.err().map(|e| e.to_string());
    for reply in replies {
        let outcome = match &failure {
            None => Ok(()),
            Some(message) => Err(StoreError::Io(std::io::Error::other(message.clone()))),
        };
        let _ = reply.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::repository::MockMessageStore, infrastructure::store::JsonFileMessageStore,
    };
    use charla_shared::time::{Clock, FixedClock};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 並行 append がすべて残ること（lost update が起きない）
    // - 内側ストアのエラーが呼び出し側に返ること
    //
    // 【なぜこのテストが必要か】
    // - 生の JSON ファイルストアは読み込み・書き込みが交差すると更新を失う
    // - サーバーは必ずこのキューを経由して書き込む
    // ========================================

    fn record(text: String) -> ChatRecord {
        ChatRecord::new(text, Some("alice"), FixedClock::from_millis(0).now_utc())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_all_survive() {
        // テスト項目: 並行する 50 件の append がすべてログに残る
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let inner = Arc::new(JsonFileMessageStore::new(dir.path().join("chat.json")));
        let store = QueuedMessageStore::spawn(inner);
        store.ensure_initialized().await.unwrap();

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(record(format!("[alice] {}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // then (期待する結果):
        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 50);
        let mut texts: Vec<String> = records.into_iter().map(|r| r.text).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), 50);
    }

    #[tokio::test]
    async fn test_sequential_appends_keep_order() {
        // テスト項目: 順番に await した append は呼び出し順に保存される
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let inner = Arc::new(JsonFileMessageStore::new(dir.path().join("chat.json")));
        let store = QueuedMessageStore::spawn(inner);

        // when (操作):
        for i in 0..5 {
            store.append(record(format!("[alice] {}", i))).await.unwrap();
        }

        // then (期待する結果):
        let texts: Vec<String> = store
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(
            texts,
            (0..5).map(|i| format!("[alice] {}", i)).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_inner_failure_is_returned_to_caller() {
        // テスト項目: 内側ストアの失敗が append の呼び出し側に返る
        // given (前提条件):
        let mut inner = MockMessageStore::new();
        inner
            .expect_append()
            .returning(|_| Err(StoreError::Io(std::io::Error::other("disk full"))));
        let store = QueuedMessageStore::spawn(Arc::new(inner));

        // when (操作):
        let result = store.append(record("[alice] hola".to_string())).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_batched_append_failure_reaches_every_waiter() {
        // テスト項目: まとめ書き込みが失敗した場合、すべての待機者にエラーが返る
        // given (前提条件):
        let mut inner = MockMessageStore::new();
        inner
            .expect_append()
            .returning(|_| Err(StoreError::Io(std::io::Error::other("disk full"))));
        inner.expect_load().returning(|| Ok(Vec::new()));
        inner
            .expect_save()
            .returning(|_| Err(StoreError::Io(std::io::Error::other("disk full"))));
        let store = QueuedMessageStore::spawn(Arc::new(inner));

        // when (操作):
        let results = futures_util::future::join_all(
            (0..8).map(|i| store.append(record(format!("[alice] {}", i)))),
        )
        .await;

        // then (期待する結果):
        assert!(results.iter().all(|r| r.is_err()));
    }
}
