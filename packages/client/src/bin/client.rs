//! Terminal chat client for the Charla relay.
//!
//! Sends the display name as the first frame, shows the recent history, then relays
//! every line typed on stdin. Reconnects on disconnection (max 5 attempts with 5
//! second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin charla-client -- --name Alice
//! cargo run --bin charla-client -- -n Bob --history 0
//! ```

use clap::Parser;

use charla_client::{ClientOptions, run_client};
use charla_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "charla-client")]
#[command(about = "Terminal client for the Charla chat relay", long_about = None)]
struct Args {
    /// Display name (the server picks one when omitted)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// HTTP base URL used to fetch the history
    #[arg(short = 'a', long, default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Number of recent messages to show on connect (0 disables)
    #[arg(long, default_value = "20")]
    history: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        api_url: args.api_url,
        name: args.name,
        history: args.history,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
