//! WebSocket connection handlers.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    Stream, future,
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{domain::TransportError, ui::state::AppState, usecase::ChatSession};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::debug!("WebSocket upgrade requested by {}", peer);
    ws.on_upgrade(move |socket| handle_socket(socket, state, Some(peer)))
}

/// Spawns a task that drains the connection's channel into the WebSocket sink.
///
/// When a write fails the task ends and drops the receiver, so every later push
/// to this connection fails and the broadcaster prunes it.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
        }
        let _ = sender.close().await;
    })
}

/// Inbound text lines until the peer closes.
///
/// Ping/pong is answered by the transport and skipped here. A binary frame is not
/// part of the protocol and ends the session like a read error.
fn inbound_lines(
    receiver: SplitStream<WebSocket>,
) -> impl Stream<Item = Result<String, TransportError>> + Send {
    receiver
        .take_while(|frame| future::ready(!matches!(frame, Ok(Message::Close(_)))))
        .filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(_)) => Some(Err(TransportError::UnexpectedFrame("binary"))),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Close(_)) => None,
                Err(e) => Some(Err(TransportError::Receive(e.to_string()))),
            })
        })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, peer: Option<SocketAddr>) {
    let (sender, receiver) = socket.split();

    // Outbound frames for this client are pushed through this channel
    let (tx, rx) = mpsc::unbounded_channel();
    let send_task = pusher_loop(rx, sender);

    let session = ChatSession::new(peer, state.broadcaster.clone(), state.registry.clone());
    let id = session.id();
    tracing::info!("Connection {} accepted from {:?}", id, peer);

    if let Err(e) = session.run(inbound_lines(receiver), tx).await {
        tracing::error!("Session {} ended abnormally: {}", id, e);
    }

    send_task.abort();
    tracing::info!("Connection {} closed", id);
}
