//! HTTP API endpoint handlers.

use std::{fmt::Display, sync::Arc};

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    domain::{
        HistoryPage, PageRequest,
        history::{DEFAULT_LIMIT, DEFAULT_OFFSET},
    },
    ui::state::AppState,
};

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Query parameters for `GET /messages`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_offset")]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only `[name] text` lines
    #[serde(default)]
    pub only_user: bool,
}

fn default_offset() -> i64 {
    DEFAULT_OFFSET
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn api_error(status: StatusCode, detail: impl Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "detail": detail.to_string() })),
    )
}

/// Paginated message history
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryPage>, ApiError> {
    let Query(query) = query.map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    let request = PageRequest::new(query.offset, query.limit, query.only_user)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    match state.get_history_usecase.execute(request).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to load message history: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
