//! UseCase layer: chat flows built on the domain traits.

pub mod broadcast;
pub mod get_history;
pub mod session;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use get_history::GetHistoryUseCase;
pub use session::ChatSession;
