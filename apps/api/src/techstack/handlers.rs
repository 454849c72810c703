//! Axum route handlers for the Prompt API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::prompt::{Difficulty, PromptRow};
use crate::state::AppState;
use crate::techstack::agent::generate_tech_stack_prompt;

#[derive(Debug, Deserialize)]
pub struct GeneratePromptRequest {
    pub tech_stack: String,
    pub difficulty: String,
}

/// POST /prompts/generate
pub async fn handle_generate_prompt(
    State(state): State<AppState>,
    Json(request): Json<GeneratePromptRequest>,
) -> Result<Json<PromptRow>, AppError> {
    if request.tech_stack.trim().is_empty() {
        return Err(AppError::Validation(
            "tech_stack cannot be empty".to_string(),
        ));
    }
    let difficulty = Difficulty::parse(&request.difficulty).ok_or_else(|| {
        AppError::Validation("Invalid difficulty level. Use EASY, MEDIUM, or HARD.".to_string())
    })?;

    let prompt =
        generate_tech_stack_prompt(&state.db, &state.llm, &request.tech_stack, difficulty).await?;

    Ok(Json(prompt))
}

/// GET /prompts
pub async fn handle_list_prompts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromptRow>>, AppError> {
    let prompts: Vec<PromptRow> =
        sqlx::query_as("SELECT * FROM prompts ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(prompts))
}

/// GET /prompts/:prompt_id
pub async fn handle_get_prompt(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> Result<Json<PromptRow>, AppError> {
    let prompt: Option<PromptRow> = sqlx::query_as("SELECT * FROM prompts WHERE prompt_id = $1")
        .bind(prompt_id)
        .fetch_optional(&state.db)
        .await?;
    let prompt =
        prompt.ok_or_else(|| AppError::NotFound(format!("Prompt {prompt_id} not found")))?;
    Ok(Json(prompt))
}
