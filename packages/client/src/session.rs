//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    history::fetch_recent,
    runner::ClientOptions,
    ui::redisplay_prompt,
};

/// Run one WebSocket client session.
///
/// Returns `Ok(())` when the user quits (Ctrl+C / Ctrl+D) and an error when the
/// connection is lost. The display name goes out as the first frame; an empty name lets the server
/// pick one from our address.
pub async fn run_client_session(
    options: &ClientOptions,
    show_history: bool,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(options.url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");

    let (mut write, mut read) = ws_stream.split();

    let name = options.name.clone().unwrap_or_default();
    write
        .send(Message::Text(name.clone().into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let prompt_name = if name.trim().is_empty() {
        "me".to_string()
    } else {
        name.trim().to_string()
    };

    if show_history && options.history > 0 {
        match fetch_recent(&options.api_url, options.history).await {
            Ok(items) => print!("{}", MessageFormatter::format_history(&items)),
            Err(e) => tracing::warn!("{}", e),
        }
    }
    println!("\nType messages and press Enter to send. Press Ctrl+C to exit.\n");

    // Spawn a task to handle incoming messages
    let prompt_for_read = prompt_name.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format_frame(text.as_str()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_input = prompt_name.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_for_input);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    // The server drops whitespace-only lines anyway
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to forward input lines to the WebSocket
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            if let Err(e) = write.send(Message::Text(line.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                return Err(ClientError::ConnectionError(e.to_string()));
            }
        }
        let _ = write.close().await;
        Ok(())
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            Err(ClientError::ConnectionError("Connection lost".to_string()))
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
    }
}
