//! UseCase: メッセージ履歴のページ取得

use std::sync::Arc;

use crate::domain::{HistoryPage, MessageStore, PageRequest, StoreError};

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    store: Arc<dyn MessageStore>,
}

impl GetHistoryUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Load the full log, optionally keep only `[name] text` lines, and slice one page.
    pub async fn execute(&self, request: PageRequest) -> Result<HistoryPage, StoreError> {
        let records = self.store.load().await?;
        Ok(HistoryPage::paginate(records, &request))
    }
}
