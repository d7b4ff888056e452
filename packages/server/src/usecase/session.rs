//! UseCase: 1 接続分のセッション（名前の交渉 → 受信ループ → 切断処理）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession の状態遷移（Connecting → Handshaking → Active → Closed）
//! - 参加通知・チャット行・退出通知がログと配信に反映されること
//!
//! ### なぜこのテストが必要か
//! - 参加通知は本人を含む全員、退出通知は本人を除く全員、という非対称性を保証する
//! - 空行の抑制、名前の自動生成、刈り取り済み接続の扱いを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加 → 発言 → 切断
//! - エッジケース：空の名前、空白のみの行、ハンドシェイク中の切断
//! - 異常系：受信エラー、不正な順序での呼び出し

use std::{net::SocketAddr, pin::pin, sync::Arc};

use futures_util::{Stream, StreamExt};

use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, DisplayName, PusherChannel, SessionError,
    SessionState, TransportError, render,
};

use super::broadcast::{BroadcastReport, Broadcaster};

/// Lifecycle of one client connection.
pub struct ChatSession {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    state: SessionState,
    name: Option<DisplayName>,
    broadcaster: Arc<Broadcaster>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl ChatSession {
    pub fn new(
        peer: Option<SocketAddr>,
        broadcaster: Arc<Broadcaster>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            id: ConnectionId::generate(),
            peer,
            state: SessionState::Connecting,
            name: None,
            broadcaster,
            registry,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn name(&self) -> Option<&DisplayName> {
        self.name.as_ref()
    }

    fn transition(
        &mut self,
        next: SessionState,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if !self.state.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                operation,
                state: self.state,
            });
        }
        tracing::debug!("Session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        Ok(())
    }

    /// The transport accepted the connection.
    pub fn accept(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Handshaking, "accept")
    }

    /// Settle the display name, register the connection and announce it to
    /// everyone, this connection included.
    ///
    /// `proposed` is the first inbound line, or `None` when reading it failed.
    pub async fn handshake(
        &mut self,
        proposed: Option<&str>,
        channel: PusherChannel,
    ) -> Result<BroadcastReport, SessionError> {
        self.transition(SessionState::Active, "handshake")?;

        let name = DisplayName::negotiate(proposed, self.peer, &self.id);
        self.registry
            .register(Connection::new(self.id, channel), name.clone())
            .await;
        tracing::info!("Session {} joined as '{}'", self.id, name);

        let report = self
            .broadcaster
            .broadcast(render::joined(&name), None, None)
            .await;
        self.name = Some(name);
        Ok(report)
    }

    /// Handle one inbound line while active.
    ///
    /// Whitespace-only lines are dropped and yield `Ok(None)`. Everything else is
    /// broadcast as `[name] text` to every connection, the sender included.
    pub async fn receive(&mut self, line: &str) -> Result<Option<BroadcastReport>, SessionError> {
        let name = match (&self.state, &self.name) {
            (SessionState::Active, Some(name)) => name,
            _ => {
                return Err(SessionError::InvalidTransition {
                    operation: "receive",
                    state: self.state,
                });
            }
        };

        let text = line.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let report = self
            .broadcaster
            .broadcast(render::chat_line(name, text), Some(name), None)
            .await;
        Ok(Some(report))
    }

    /// Leave the chat.
    ///
    /// Announces the departure to everyone else only if the registry still held
    /// this connection; a connection pruned after a failed push leaves silently.
    pub async fn close(&mut self) -> Result<Option<BroadcastReport>, SessionError> {
        self.transition(SessionState::Closed, "close")?;

        let Some(name) = self.registry.unregister(&self.id).await else {
            tracing::info!("Session {} closed without a registry entry", self.id);
            return Ok(None);
        };
        tracing::info!("Session {} ('{}') left", self.id, name);

        let report = self
            .broadcaster
            .broadcast(render::left(&name), None, Some(&self.id))
            .await;
        Ok(Some(report))
    }

    /// Drive the whole lifecycle over a stream of inbound text lines.
    ///
    /// The stream ending is a disconnect; an `Err` item is a receive failure and
    /// is handled the same way. Cleanup always runs.
    pub async fn run<S>(mut self, inbound: S, channel: PusherChannel) -> Result<(), SessionError>
    where
        S: Stream<Item = Result<String, TransportError>>,
    {
        let mut inbound = pin!(inbound);

        self.accept()?;

        let proposed = match inbound.next().await {
            Some(Ok(line)) => Some(line),
            Some(Err(e)) => {
                tracing::warn!("Session {}: handshake read failed: {}", self.id, e);
                None
            }
            None => None,
        };
        self.handshake(proposed.as_deref(), channel).await?;

        while let Some(item) = inbound.next().await {
            match item {
                Ok(line) => {
                    self.receive(&line).await?;
                }
                Err(e) => {
                    tracing::warn!("Session {}: {}", self.id, e);
                    break;
                }
            }
        }

        self.close().await?;
        Ok(())
    }
}
