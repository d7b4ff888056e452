//! MessageStore trait 定義
//!
//! ドメイン層が必要とするメッセージログへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ChatRecord, StoreError};

/// Durable, append-only chat log.
///
/// The whole log is one ordered sequence; appending is a
/// load / push / save cycle over the full sequence (O(n) per record).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Create an empty log if none exists. Idempotent.
    async fn ensure_initialized(&self) -> Result<(), StoreError>;

    /// Read the full log.
    ///
    /// A missing or unparseable log is reset to empty rather than reported;
    /// only a failure to perform that reset is an error.
    async fn load(&self) -> Result<Vec<ChatRecord>, StoreError>;

    /// Append one record at the end of the log.
    async fn append(&self, record: ChatRecord) -> Result<(), StoreError>;

    /// Replace the full log. Readers never observe a partial write.
    async fn save(&self, records: &[ChatRecord]) -> Result<(), StoreError>;
}
