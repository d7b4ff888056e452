//! Paginated history queries over the message log.

use serde::Serialize;

use super::{entity::ChatRecord, error::PageRequestError};

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 500;

/// Validated history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: usize,
    limit: usize,
    only_user: bool,
}

impl PageRequest {
    /// # Errors
    ///
    /// Rejects a negative offset and a limit outside `1..=500`.
    pub fn new(offset: i64, limit: i64, only_user: bool) -> Result<Self, PageRequestError> {
        let offset =
            usize::try_from(offset).map_err(|_| PageRequestError::NegativeOffset(offset))?;
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| (MIN_LIMIT..=MAX_LIMIT).contains(l))
            .ok_or(PageRequestError::LimitOutOfRange {
                got: limit,
                min: MIN_LIMIT,
                max: MAX_LIMIT,
            })?;
        Ok(Self {
            offset,
            limit,
            only_user,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn only_user(&self) -> bool {
        self.only_user
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET as usize,
            limit: DEFAULT_LIMIT as usize,
            only_user: false,
        }
    }
}

/// One page of the (optionally filtered) log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPage {
    /// Number of records after filtering, before slicing
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<ChatRecord>,
}

impl HistoryPage {
    /// Filter then slice `[offset, offset + limit)`, clipped to what exists.
    pub fn paginate(records: Vec<ChatRecord>, request: &PageRequest) -> Self {
        let filtered: Vec<ChatRecord> = if request.only_user {
            records
                .into_iter()
                .filter(ChatRecord::is_user_message)
                .collect()
        } else {
            records
        };

        let total = filtered.len();
        let items = filtered
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();

        Self {
            total,
            offset: request.offset,
            limit: request.limit,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_shared::time::{Clock, FixedClock};

    fn create_records(count: usize) -> Vec<ChatRecord> {
        let at = FixedClock::from_millis(0).now_utc();
        (0..count)
            .map(|i| ChatRecord::new(format!("[alice] message {}", i), Some("alice"), at))
            .collect()
    }

    #[test]
    fn test_page_request_defaults() {
        // テスト項目: デフォルトは offset=0, limit=50, only_user=false
        // given (前提条件):

        // when (操作):
        let request = PageRequest::default();

        // then (期待する結果):
        assert_eq!(request, PageRequest::new(0, 50, false).unwrap());
    }

    #[test]
    fn test_page_request_rejects_invalid_values() {
        // テスト項目: 負の offset と範囲外の limit は拒否される
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(
            PageRequest::new(-1, 50, false),
            Err(PageRequestError::NegativeOffset(-1))
        );
        assert!(matches!(
            PageRequest::new(0, 0, false),
            Err(PageRequestError::LimitOutOfRange { got: 0, .. })
        ));
        assert!(matches!(
            PageRequest::new(0, 501, false),
            Err(PageRequestError::LimitOutOfRange { got: 501, .. })
        ));
        assert!(PageRequest::new(0, 500, false).is_ok());
        assert!(PageRequest::new(0, 1, false).is_ok());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        // テスト項目: 120 件中 offset=100, limit=50 で 20 件が返る
        // given (前提条件):
        let records = create_records(120);
        let request = PageRequest::new(100, 50, false).unwrap();

        // when (操作):
        let page = HistoryPage::paginate(records, &request);

        // then (期待する結果):
        assert_eq!(page.total, 120);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].text, "[alice] message 100");
        assert_eq!(page.items[19].text, "[alice] message 119");
        assert_eq!(page.offset, 100);
        assert_eq!(page.limit, 50);
    }

    #[test]
    fn test_paginate_offset_past_end() {
        // テスト項目: 範囲外の offset では items が空で total は正しい
        // given (前提条件):
        let records = create_records(120);
        let request = PageRequest::new(200, 50, false).unwrap();

        // when (操作):
        let page = HistoryPage::paginate(records, &request);

        // then (期待する結果):
        assert_eq!(page.total, 120);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_paginate_only_user_filters_before_counting() {
        // テスト項目: only_user=true ではフィルタ後の件数が total になる
        // given (前提条件):
        let at = FixedClock::from_millis(0).now_utc();
        let records = vec![
            ChatRecord::new("🟢 alice se unió al chat", None, at),
            ChatRecord::new("[alice] hola", Some("alice"), at),
            ChatRecord::new("🟢 bob se unió al chat", None, at),
            ChatRecord::new("[bob] qué tal", Some("bob"), at),
            ChatRecord::new("🔴 alice salió del chat", None, at),
        ];
        let request = PageRequest::new(0, 50, true).unwrap();

        // when (操作):
        let page = HistoryPage::paginate(records, &request);

        // then (期待する結果):
        assert_eq!(page.total, 2);
        let texts: Vec<&str> = page.items.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["[alice] hola", "[bob] qué tal"]);
    }
}
