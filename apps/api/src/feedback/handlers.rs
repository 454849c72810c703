//! Axum route handlers for the Feedback API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::generator::{generate_feedback, FeedbackResponse, ImprovementArea};
use crate::models::interview::InterviewFeedbackRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateFeedbackRequest {
    pub interview_id: Uuid,
}

/// POST /feedback/generate
///
/// Generating twice creates a second row; callers should GET first.
pub async fn handle_generate_feedback(
    State(state): State<AppState>,
    Json(request): Json<GenerateFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = generate_feedback(&state.db, &state.llm, request.interview_id).await?;
    Ok(Json(feedback))
}

/// GET /feedback/:interview_id
///
/// Returns the most recent feedback for the interview.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let row: Option<InterviewFeedbackRow> = sqlx::query_as(
        "SELECT * FROM interview_feedback WHERE interview_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(interview_id)
    .fetch_optional(&state.db)
    .await?;
    let row = row.ok_or_else(|| {
        AppError::NotFound(format!("No feedback found for interview {interview_id}"))
    })?;

    let improvement_areas: Vec<ImprovementArea> =
        serde_json::from_value(row.improvement_areas.clone())
            .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(FeedbackResponse {
        feedback_id: row.feedback_id,
        interview_id: row.interview_id,
        overall_score: row.overall_score,
        overall_feedback: row.overall_feedback,
        strengths: row.strengths,
        improvement_areas,
        next_steps: row.next_steps,
        created_at: row.created_at,
    }))
}
