//! Charla chat relay server.
//!
//! Clients connect over WebSocket, announce a display name, and every line they
//! send is persisted to a JSON log and relayed to all connected clients.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
