//! Domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use charla_shared::time::to_iso8601;

use super::value_object::SYSTEM_AUTHOR;

/// One persisted chat line.
///
/// `text` is exactly what was pushed to the clients; `author` and `ts` only live in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub text: String,
    pub author: String,
    /// ISO-8601 UTC, assigned when the record is persisted
    pub ts: String,
}

impl ChatRecord {
    /// Build a record stamped with `at`. A missing author means a system notice.
    pub fn new(text: impl Into<String>, author: Option<&str>, at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            author: author.unwrap_or(SYSTEM_AUTHOR).to_string(),
            ts: to_iso8601(at),
        }
    }

    pub fn is_system(&self) -> bool {
        self.author == SYSTEM_AUTHOR
    }

    /// `true` for lines shaped like `[name] text`.
    pub fn is_user_message(&self) -> bool {
        is_user_message(&self.text)
    }
}

/// A text starting with `[` that has a `]` somewhere after it.
pub fn is_user_message(text: &str) -> bool {
    text.strip_prefix('[')
        .is_some_and(|rest| rest.contains(']'))
}

/// Chat line rendering shared by every recipient.
pub mod render {
    use crate::domain::DisplayName;

    pub fn joined(name: &DisplayName) -> String {
        format!("🟢 {} se unió al chat", name)
    }

    pub fn left(name: &DisplayName) -> String {
        format!("🔴 {} salió del chat", name)
    }

    pub fn chat_line(name: &DisplayName, text: &str) -> String {
        format!("[{}] {}", name, text)
    }
}
