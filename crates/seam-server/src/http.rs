//! HTTP routes for the hosting surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use seam_wire::RunAgentInput;

use crate::run::{prepare_resume, spawn_run};
use crate::service::{message_page, ApiError, MessagePage, MessageQueryParams};
use crate::sse::{sse_body_stream, sse_response};

pub use crate::service::AppState;

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Run endpoint path.
pub const RUNS_PATH: &str = "/v1/runs";
/// Thread message history endpoint path.
pub const THREAD_MESSAGES_PATH: &str = "/v1/threads/{id}/messages";

/// Build health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}

/// Build run and history routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(RUNS_PATH, post(run))
        .route(THREAD_MESSAGES_PATH, get(thread_messages))
}

/// Combined router for embedding or serving.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(api_routes())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn run(
    State(st): State<AppState>,
    Json(request): Json<RunAgentInput>,
) -> Result<Response, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // The load must observe the previous run's save, so the lock comes first.
    let guard = st.locks.acquire(&request.thread_id).await;
    let mut session = st.store.get_or_empty(&request.thread_id).await?;
    let resume = prepare_resume(&mut session, &request)?;

    let rx = spawn_run(st, request, session, resume, guard);
    Ok(sse_response(sse_body_stream(rx)))
}

async fn thread_messages(
    State(st): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MessageQueryParams>,
) -> Result<Json<MessagePage>, ApiError> {
    let Some(session) = st.store.load_session(&id).await? else {
        return Err(ApiError::ThreadNotFound(id));
    };
    Ok(Json(message_page(&session.messages, &params)))
}
