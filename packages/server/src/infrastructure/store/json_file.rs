//! JSON ファイルによる MessageStore 実装
//!
//! ログ全体を 1 つの JSON 配列として保存します。書き込みは必ず
//! `<path>.tmp` に書いてから rename で置き換えるため、読み手が
//! 書きかけのファイルを見ることはありません。
//!
//! ## 制約
//!
//! - append は「全件読み込み → 追加 → 全件書き込み」なので 1 件あたり O(n)
//! - このストアを複数タスクから直接使うと、読み込みと書き込みが交差した append の
//!   どちらかが失われる（last writer wins）。サーバーは `QueuedMessageStore` 経由でのみ使う

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::domain::{ChatRecord, MessageStore, StoreError};

const TEMP_SUFFIX: &str = ".tmp";
const EMPTY_LOG: &str = "[]\n";

/// Message log stored as one JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileMessageStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl JsonFileMessageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_path = OsString::from(path.as_os_str());
        temp_path.push(TEMP_SUFFIX);
        Self {
            path,
            temp_path: PathBuf::from(temp_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    async fn read_records(&self) -> Result<Vec<ChatRecord>, StoreError> {
        let content = fs::read_to_string(&self.path).await?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(content)?)
    }

    async fn write_atomically(&self, content: &[u8]) -> Result<(), StoreError> {
        let mut file = fs::File::create(&self.temp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&self.temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for JsonFileMessageStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, EMPTY_LOG).await?;
        tracing::info!("Created empty message log at {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ChatRecord>, StoreError> {
        match self.read_records().await {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Message log {} is unusable ({}), resetting it to an empty log",
                    self.path.display(),
                    e
                );
                self.save(&[]).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn append(&self, record: ChatRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await
    }

    async fn save(&self, records: &[ChatRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;
        self.write_atomically(&json).await
    }
}
