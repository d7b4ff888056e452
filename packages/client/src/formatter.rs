//! Message formatting utilities for client display.

use chrono::{DateTime, Local};

use crate::history::HistoryItem;

/// Kind of an inbound frame, inferred from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Joined,
    Left,
    Chat,
    Other,
}

impl FrameKind {
    pub fn of(text: &str) -> Self {
        if text.starts_with("🟢 ") {
            Self::Joined
        } else if text.starts_with("🔴 ") {
            Self::Left
        } else if text.strip_prefix('[').is_some_and(|rest| rest.contains(']')) {
            Self::Chat
        } else {
            Self::Other
        }
    }
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one live frame. Notices are indented to set them apart from chat lines.
    pub fn format_frame(text: &str) -> String {
        match FrameKind::of(text) {
            FrameKind::Joined | FrameKind::Left => format!("\n    {}\n", text),
            FrameKind::Chat | FrameKind::Other => format!("\n{}\n", text),
        }
    }

    /// Format the recent history shown right after connecting.
    pub fn format_history(items: &[HistoryItem]) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        if items.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for item in items {
                output.push_str(&format!("{} {}\n", Self::format_time(&item.ts), item.text));
            }
        }
        output.push_str("============================================================\n");
        output
    }

    /// `HH:MM:SS` in local time, or the raw value if it is not RFC 3339.
    pub fn format_time(ts: &str) -> String {
        DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| ts.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kind_of() {
        // テスト項目: フレームの種類が本文の形から判定される
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(FrameKind::of("🟢 alice se unió al chat"), FrameKind::Joined);
        assert_eq!(FrameKind::of("🔴 alice salió del chat"), FrameKind::Left);
        assert_eq!(FrameKind::of("[alice] hola"), FrameKind::Chat);
        assert_eq!(FrameKind::of("hola"), FrameKind::Other);
    }

    #[test]
    fn test_format_frame_indents_notices() {
        // テスト項目: 通知はインデントされ、チャット行はそのまま表示される
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(
            MessageFormatter::format_frame("🟢 bob se unió al chat"),
            "\n    🟢 bob se unió al chat\n"
        );
        assert_eq!(
            MessageFormatter::format_frame("[bob] hola"),
            "\n[bob] hola\n"
        );
    }

    #[test]
    fn test_format_history_empty() {
        // テスト項目: 履歴が空の場合はその旨が表示される
        // given (前提条件):
        let items: Vec<HistoryItem> = Vec::new();

        // when (操作):
        let output = MessageFormatter::format_history(&items);

        // then (期待する結果):
        assert!(output.contains("(No messages yet)"));
    }

    #[test]
    fn test_format_history_lists_items_in_order() {
        // テスト項目: 履歴が古い順に時刻付きで表示される
        // given (前提条件):
        let items = vec![
            HistoryItem {
                text: "[alice] hola".to_string(),
                author: "alice".to_string(),
                ts: "2023-01-01T00:00:00.000000+00:00".to_string(),
            },
            HistoryItem {
                text: "[bob] qué tal".to_string(),
                author: "bob".to_string(),
                ts: "not-a-timestamp".to_string(),
            },
        ];

        // when (操作):
        let output = MessageFormatter::format_history(&items);

        // then (期待する結果):
        let alice = output.find("[alice] hola").unwrap();
        let bob = output.find("not-a-timestamp [bob] qué tal").unwrap();
        assert!(alice < bob);
    }

    #[test]
    fn test_format_time_falls_back_to_raw_value() {
        // テスト項目: 解析できないタイムスタンプはそのまま返される
        // given (前提条件):

        // when (操作):
        let result = MessageFormatter::format_time("yesterday");

        // then (期待する結果):
        assert_eq!(result, "yesterday");
    }
}
