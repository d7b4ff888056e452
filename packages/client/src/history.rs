//! Message history fetched from the relay's `/messages` endpoint.

use serde::Deserialize;

use crate::error::ClientError;

/// Largest page the server accepts
pub const MAX_PAGE: usize = 500;

/// One persisted chat line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryItem {
    pub text: String,
    pub author: String,
    pub ts: String,
}

/// Response body of `GET /messages`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryPage {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<HistoryItem>,
}

/// Offset of the last `count` records out of `total`.
pub fn tail_offset(total: usize, count: usize) -> usize {
    total.saturating_sub(count)
}

/// Fetch the most recent `count` records (at most 500), oldest first.
pub async fn fetch_recent(api_url: &str, count: usize) -> Result<Vec<HistoryItem>, ClientError> {
    let count = count.clamp(1, MAX_PAGE);
    let http = reqwest::Client::new();
    let base = format!("{}/messages", api_url.trim_end_matches('/'));

    let probe: HistoryPage = http
        .get(&base)
        .query(&[("limit", 1)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let offset = tail_offset(probe.total, count);
    let page: HistoryPage = http
        .get(&base)
        .query(&[("offset", offset), ("limit", count)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    tracing::debug!(
        "Fetched {} of {} history records",
        page.items.len(),
        page.total
    );
    Ok(page.items)
}
