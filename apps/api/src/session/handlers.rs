//! Axum route handlers for the interview session lifecycle.

use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::prompt::PromptRow;
use crate::models::user::User;
use crate::session::cache::PendingSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub user_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub interview_id: Uuid,
    pub session_token: Uuid,
}

/// POST /schedule
pub async fn handle_schedule(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let scheduled = state
        .coordinator
        .schedule(request.user_id, request.prompt_id, request.resume_id)
        .await?;

    Ok(Json(ScheduleResponse {
        message: "Interview scheduled successfully".to_string(),
        interview_id: scheduled.interview_id,
        session_token: scheduled.session_token,
    }))
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub message: String,
    pub interview_data: PendingSession,
}

/// GET /validate/:session_token
pub async fn handle_validate(
    State(state): State<AppState>,
    Path(session_token): Path<Uuid>,
) -> Result<Json<ValidateResponse>, AppError> {
    let pending = state.coordinator.validate_session(session_token).await?;

    Ok(Json(ValidateResponse {
        message: "Interview session is valid".to_string(),
        interview_data: pending,
    }))
}

#[derive(Debug, Serialize)]
pub struct EndOfCallResponse {
    pub status: String,
    pub message: String,
    pub interview_id: Uuid,
    pub success_evaluation: i32,
}

/// POST /vapi-end-of-call
///
/// The provider's webhook. The body is taken raw so that invalid JSON maps
/// to our own malformed-payload error instead of the extractor's rejection.
pub async fn handle_end_of_call(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EndOfCallResponse>, AppError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::MalformedPayload(format!("invalid JSON: {e}")))?;

    let outcome = state.coordinator.handle_report(&payload).await?;

    Ok(Json(EndOfCallResponse {
        status: "success".to_string(),
        message: "Interview report stored successfully".to_string(),
        interview_id: outcome.interview_id,
        success_evaluation: outcome.success_evaluation,
    }))
}

#[derive(Debug, Serialize)]
pub struct EndInterviewResponse {
    pub message: String,
}

/// POST /end-interview/:session_token
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(session_token): Path<Uuid>,
) -> Result<Json<EndInterviewResponse>, AppError> {
    state.coordinator.end_session(session_token).await?;

    Ok(Json(EndInterviewResponse {
        message: "Interview session ended".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub session_token: Uuid,
}

/// POST /interview/start
///
/// Validates the session token, then relays the call-start request to the
/// voice provider with the session's prompt as the system message.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<Value>, AppError> {
    let pending = state
        .coordinator
        .validate_session(request.session_token)
        .await?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE user_id = $1")
        .bind(pending.user_id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| AppError::NotFound(format!("User {} not found", pending.user_id)))?;

    let prompt = match pending.prompt_id {
        Some(prompt_id) => {
            sqlx::query_as::<_, PromptRow>("SELECT * FROM prompts WHERE prompt_id = $1")
                .bind(prompt_id)
                .fetch_optional(&state.db)
                .await?
        }
        None => None,
    };

    let provider_response = state
        .vapi
        .start_call(
            pending.session_token,
            &user.username,
            prompt.as_ref().map(|p| p.content.as_str()),
        )
        .await?;

    Ok(Json(provider_response))
}
