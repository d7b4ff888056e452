//! Terminal client for the Charla chat relay.

pub mod error;
pub mod formatter;
pub mod history;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::{ClientOptions, run_client};
