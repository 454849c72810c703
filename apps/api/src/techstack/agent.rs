//! LLM-backed generation of tech-stack interview prompts.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::prompt::{Difficulty, PromptRow};
use crate::techstack::prompts::{
    TECHSTACK_EASY, TECHSTACK_HARD, TECHSTACK_MEDIUM, TECHSTACK_SYSTEM,
};

/// Generates an interview prompt for the given stack and difficulty and
/// persists it as a `Prompt` row.
pub async fn generate_tech_stack_prompt(
    pool: &PgPool,
    llm: &LlmClient,
    tech_stack: &str,
    difficulty: Difficulty,
) -> Result<PromptRow, AppError> {
    let template = match difficulty {
        Difficulty::Easy => TECHSTACK_EASY,
        Difficulty::Medium => TECHSTACK_MEDIUM,
        Difficulty::Hard => TECHSTACK_HARD,
    };
    let prompt = template.replace("{tech_stack}", tech_stack);

    tracing::info!(tech_stack, ?difficulty, "Generating interview prompt");

    let response = llm
        .call(&prompt, TECHSTACK_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Prompt generation failed: {e}")))?;
    let content = response
        .text()
        .ok_or_else(|| AppError::Llm("LLM returned empty content".to_string()))?;

    let row: PromptRow = sqlx::query_as(
        r#"
        INSERT INTO prompts (prompt_id, tech_stack, difficulty, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tech_stack)
    .bind(difficulty)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
