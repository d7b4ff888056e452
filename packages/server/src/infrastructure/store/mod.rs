//! メッセージログの実装
//!
//! - `json_file`: 1 つの JSON 配列ファイル（アトミックな置き換え）
//! - `queued`: 単一ライタータスクで全操作を直列化するフロントエンド

pub mod json_file;
pub mod queued;

pub use json_file::JsonFileMessageStore;
pub use queued::QueuedMessageStore;
