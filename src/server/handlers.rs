//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use tracing::{debug, error};

use super::dto::*;
use super::error::ApiError;
use super::AppState;
use crate::error::HrAgentError;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    if request.message.trim().is_empty() {
        return Err(ApiError::unprocessable("message must not be empty"));
    }
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty());

    debug!(session_id = ?session_id, "chat request");
    let reply = state
        .agent
        .respond(&request.message, session_id)
        .await
        .map_err(|e| {
            error!(error = %e, category = %e.category(), "chat failed");
            ApiError::processing(&e)
        })?;

    state
        .sessions
        .record_turn(&reply.session_id, &request.message, &reply.content)
        .await;

    Ok(Json(ChatResponse {
        session_id: reply.session_id,
        content: reply.content,
        timestamp: Utc::now(),
        is_new_session: reply.is_new_session,
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    let record = state
        .sessions
        .get(&session_id)
        .await
        .ok_or(HrAgentError::SessionNotFound(session_id))?;
    Ok(Json(record.into()))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionList> {
    let records = state.sessions.list().await;
    Json(SessionList {
        total_sessions: records.len(),
        sessions: records.iter().map(SessionSummary::from).collect(),
    })
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    match state.sessions.remove(&session_id).await {
        Some(_) => Ok(Json(DeleteResponse::deleted(&session_id))),
        None => Err(HrAgentError::SessionNotFound(session_id).into()),
    }
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
