//! WebSocket chat relay server with a persistent JSON message log.
//!
//! The first text frame a client sends is its display name; every following frame is
//! relayed to all connected clients as `[name] text` and appended to the log.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin charla-server
//! cargo run --bin charla-server -- --host 0.0.0.0 --port 3000 --db-file /var/lib/charla/chat.json
//! ```

use std::{path::PathBuf, sync::Arc};

use charla_server::{
    domain::{ConnectionRegistry, MessageStore},
    infrastructure::{
        registry::InMemoryConnectionRegistry,
        store::{JsonFileMessageStore, QueuedMessageStore},
    },
    ui::Server,
    usecase::{Broadcaster, GetHistoryUseCase},
};
use charla_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "charla-server")]
#[command(about = "WebSocket chat relay with a JSON message log", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Path of the JSON message log
    #[arg(short = 'd', long, default_value = "chat.json")]
    db_file: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. MessageStore (single writer over the JSON file)
    // 2. ConnectionRegistry
    // 3. UseCases
    // 4. Server

    // 1. Create MessageStore
    let file_store = Arc::new(JsonFileMessageStore::new(&args.db_file));
    let store: Arc<dyn MessageStore> = Arc::new(QueuedMessageStore::spawn(file_store));
    if let Err(e) = store.ensure_initialized().await {
        tracing::error!(
            "Failed to initialize message log {}: {}",
            args.db_file.display(),
            e
        );
        std::process::exit(1);
    }
    tracing::info!("Message log at {}", args.db_file.display());

    // 2. Create ConnectionRegistry
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());

    // 3. Create UseCases
    let broadcaster = Arc::new(Broadcaster::new(
        store.clone(),
        registry.clone(),
        Arc::new(SystemClock),
    ));
    let get_history_usecase = Arc::new(GetHistoryUseCase::new(store));

    // 4. Create and run the server
    let server = Server::new(broadcaster, registry, get_history_usecase);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
