//! Server execution logic.

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    domain::ConnectionRegistry,
    usecase::{Broadcaster, GetHistoryUseCase},
};

use super::{
    handler::{get_messages, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(broadcaster, registry, get_history_usecase);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// Broadcaster（永続化と配信）
    broadcaster: Arc<Broadcaster>,
    /// ConnectionRegistry（接続中クライアントの管理）
    registry: Arc<dyn ConnectionRegistry>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    get_history_usecase: Arc<GetHistoryUseCase>,
}

impl Server {
    pub fn new(
        broadcaster: Arc<Broadcaster>,
        registry: Arc<dyn ConnectionRegistry>,
        get_history_usecase: Arc<GetHistoryUseCase>,
    ) -> Self {
        Self {
            broadcaster,
            registry,
            get_history_usecase,
        }
    }

    /// Build the router: `/ws`, `/messages` and `/api/health`.
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            broadcaster: self.broadcaster,
            registry: self.registry,
            get_history_usecase: self.get_history_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/messages", get(get_messages))
            .route("/api/health", get(health_check))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Peer addresses are exposed to the handlers for display name synthesis.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
