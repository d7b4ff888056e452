//! Logging setup for the chat relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the shared crate, the server and client libraries and the
/// binary itself. `RUST_LOG` overrides the default entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "charla-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn")
///
/// # Examples
///
/// ```no_run
/// use charla_shared::logger::setup_logger;
///
/// setup_logger("charla-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    [
        env!("CARGO_PKG_NAME"),
        "charla-server",
        "charla-client",
        "tower-http",
        binary_name,
    ]
    .iter()
    .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
    .collect::<Vec<_>>()
    .join(",")
}
