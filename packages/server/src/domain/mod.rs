//! Domain layer for the chat relay.
//!
//! This module contains business rules that are independent of
//! the transport (axum WebSocket) and the storage format.

pub mod entity;
pub mod error;
pub mod history;
pub mod registry;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{ChatRecord, is_user_message, render};
pub use error::{
    MessagePushError, PageRequestError, SessionError, StoreError, TransportError,
    ValueObjectError,
};
pub use history::{HistoryPage, PageRequest};
pub use registry::{Connection, ConnectionRegistry, PusherChannel};
pub use repository::MessageStore;
pub use session::SessionState;
pub use value_object::{ConnectionId, DisplayName, SYSTEM_AUTHOR};
