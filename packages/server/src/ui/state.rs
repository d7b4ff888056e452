//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::ConnectionRegistry,
    usecase::{Broadcaster, GetHistoryUseCase},
};

/// Shared application state
pub struct AppState {
    /// Broadcaster（永続化と配信）
    pub broadcaster: Arc<Broadcaster>,
    /// ConnectionRegistry（接続中クライアントの管理）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
}
