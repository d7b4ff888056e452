//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{
    error::ClientError,
    session::run_client_session,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Connection settings from the command line
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub url: String,
    /// HTTP base URL for `/messages`
    pub api_url: String,
    /// Display name; `None` lets the server synthesize one
    pub name: Option<String>,
    /// Recent lines to show on first connect (0 disables)
    pub history: usize,
}

/// Run the WebSocket client with reconnection logic
pub async fn run_client(options: ClientOptions) -> Result<(), ClientError> {
    let mut reconnect_count = 0;
    let mut show_history = true;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            options.url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&options, show_history).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;
                show_history = false;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
