//! Shared application state and HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seam_session::{SessionStore, SessionStoreError, ThreadLocks};
use seam_wire::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::producer::UpdateProducer;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    /// Session persistence, read and write.
    pub store: Arc<dyn SessionStore>,
    /// Source of deltas for runs.
    pub producer: Arc<dyn UpdateProducer>,
    /// Per-thread run serialization.
    pub locks: Arc<ThreadLocks>,
}

impl AppState {
    /// Assemble state from its parts with a fresh lock registry.
    pub fn new(store: Arc<dyn SessionStore>, producer: Arc<dyn UpdateProducer>) -> Self {
        Self {
            store,
            producer,
            locks: Arc::new(ThreadLocks::new()),
        }
    }
}

/// Errors surfaced as HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no pending interrupt: {0}")]
    UnknownInterrupt(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            ApiError::ThreadNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::UnknownInterrupt(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = Json(serde_json::json!({ "error": msg }));
        (code, body).into_response()
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(e: SessionStoreError) -> Self {
        match e {
            SessionStoreError::NotFound(id) => ApiError::ThreadNotFound(id),
            SessionStoreError::InvalidId(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

fn default_message_limit() -> usize {
    50
}

/// Query parameters for the message history endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQueryParams {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default = "default_message_limit")]
    pub limit: usize,
}

/// One page of persisted history.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub total: usize,
    pub has_more: bool,
}

/// Slice a session's history according to the query.
pub fn message_page(messages: &[Message], params: &MessageQueryParams) -> MessagePage {
    let total = messages.len();
    let limit = params.limit.clamp(1, 200);
    let offset = params.offset.unwrap_or(0).min(total);
    let end = (offset + limit).min(total);
    MessagePage {
        messages: messages[offset..end].to_vec(),
        total,
        has_more: end < total,
    }
}
