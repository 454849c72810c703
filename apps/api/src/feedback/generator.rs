//! Coach feedback generation for completed interviews.
//!
//! Takes a persisted interview's transcript and provider score, asks the LLM
//! for a structured assessment, and persists exactly one feedback row per
//! successful call. The operation is not idempotent — callers are expected
//! to check for existing feedback first via `GET /feedback/{interview_id}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::prompts::{FEEDBACK_PROMPT, FEEDBACK_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::interview::InterviewRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub area: String,
    pub weakness: String,
    pub suggestion: String,
}

/// The structure the LLM is asked to return. A serde failure here means the
/// response was structurally invalid, which surfaces as a generation parse
/// error and persists nothing.
#[derive(Debug, Deserialize)]
struct FeedbackDraft {
    overall_score: f64,
    overall_feedback: String,
    strengths: Vec<String>,
    improvement_areas: Vec<ImprovementArea>,
    next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub feedback_id: Uuid,
    pub interview_id: Uuid,
    pub overall_score: f64,
    pub overall_feedback: String,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<ImprovementArea>,
    pub next_steps: Vec<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn generate_feedback(
    pool: &PgPool,
    llm: &LlmClient,
    interview_id: Uuid,
) -> Result<FeedbackResponse, AppError> {
    let interview: Option<InterviewRow> =
        sqlx::query_as("SELECT * FROM interviews WHERE interview_id = $1")
            .bind(interview_id)
            .fetch_optional(pool)
            .await?;
    let interview = interview
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    let (transcript, evaluation_score) = check_preconditions(&interview)?;

    let prompt = FEEDBACK_PROMPT
        .replace("{transcript}", transcript)
        .replace("{evaluation_score}", &evaluation_score.to_string())
        .replace("{duration}", &interview.duration.to_string());

    let response = llm
        .call(&prompt, FEEDBACK_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback generation failed: {e}")))?;
    let text = response
        .text()
        .ok_or_else(|| AppError::Llm("LLM returned empty content".to_string()))?;

    // The model is not guaranteed to return bare JSON; pull out the first
    // balanced object before parsing.
    let raw_json = extract_json_object(text).ok_or_else(|| {
        AppError::GenerationParse("no JSON object found in LLM response".to_string())
    })?;
    let draft: FeedbackDraft = serde_json::from_str(raw_json)
        .map_err(|e| AppError::GenerationParse(format!("invalid feedback structure: {e}")))?;

    if draft.strengths.is_empty() || draft.improvement_areas.is_empty() || draft.next_steps.is_empty()
    {
        return Err(AppError::GenerationParse(
            "feedback lists must not be empty".to_string(),
        ));
    }

    let feedback_id = Uuid::new_v4();
    let created_at = Utc::now();
    let improvement_areas_json = serde_json::to_value(&draft.improvement_areas)
        .map_err(|e| AppError::Internal(e.into()))?;

    sqlx::query(
        r#"
        INSERT INTO interview_feedback
            (feedback_id, interview_id, overall_score, overall_feedback,
             strengths, improvement_areas, next_steps, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(feedback_id)
    .bind(interview_id)
    .bind(draft.overall_score)
    .bind(&draft.overall_feedback)
    .bind(&draft.strengths)
    .bind(&improvement_areas_json)
    .bind(&draft.next_steps)
    .bind(created_at)
    .execute(pool)
    .await?;

    tracing::info!(%interview_id, %feedback_id, "Interview feedback generated");

    Ok(FeedbackResponse {
        feedback_id,
        interview_id,
        overall_score: draft.overall_score,
        overall_feedback: draft.overall_feedback,
        strengths: draft.strengths,
        improvement_areas: draft.improvement_areas,
        next_steps: draft.next_steps,
        created_at,
    })
}

/// Feedback needs both a transcript and the provider's score. The checks are
/// independent so each missing input surfaces its own message.
fn check_preconditions(interview: &InterviewRow) -> Result<(&str, i32), AppError> {
    let transcript = match interview.transcript.as_deref() {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            return Err(AppError::Validation(
                "Interview transcript not available".to_string(),
            ))
        }
    };
    let evaluation_score = interview.success_evaluation.ok_or_else(|| {
        AppError::Validation("Interview evaluation score not available".to_string())
    })?;
    Ok((transcript, evaluation_score))
}

/// Returns the first balanced `{...}` region of `text`, skipping braces
/// inside string literals and escape sequences.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn interview(transcript: Option<&str>, success_evaluation: Option<i32>) -> InterviewRow {
        InterviewRow {
            interview_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            prompt_id: Some(Uuid::new_v4()),
            resume_id: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            duration: 600,
            transcript: transcript.map(String::from),
            summary: None,
            recording_url: None,
            video_recording_url: None,
            success_evaluation,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_preconditions_pass_with_transcript_and_score() {
        let row = interview(Some("AI: ..."), Some(7));
        let (transcript, score) = check_preconditions(&row).unwrap();
        assert_eq!(transcript, "AI: ...");
        assert_eq!(score, 7);
    }

    #[test]
    fn test_missing_transcript_fails_even_with_score() {
        for transcript in [None, Some(""), Some("   ")] {
            let row = interview(transcript, Some(7));
            let err = check_preconditions(&row).unwrap_err();
            match err {
                AppError::Validation(msg) => assert!(msg.contains("transcript")),
                other => panic!("expected Validation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_score_fails_even_with_transcript() {
        let row = interview(Some("AI: ..."), None);
        let err = check_preconditions(&row).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("evaluation score")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_bare_object() {
        let text = r#"{"overall_score": 7.5}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let text = "Here is the feedback you asked for:\n{\"a\": 1}\nHope it helps!";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_nested_objects() {
        let text = r#"note {"a": {"b": {"c": 3}}, "d": 4} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": {"b": {"c": 3}}, "d": 4}"#)
        );
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"{"weakness": "used {vague} phrasing", "score": 5}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_handles_escaped_quotes() {
        let text = r#"{"feedback": "said \"um\" often"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_unbalanced_returns_none() {
        assert_eq!(extract_json_object(r#"{"a": 1"#), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_draft_rejects_missing_fields() {
        let raw = r#"{"overall_score": 7.0, "overall_feedback": "ok"}"#;
        assert!(serde_json::from_str::<FeedbackDraft>(raw).is_err());
    }

    #[test]
    fn test_draft_parses_complete_structure() {
        let raw = r#"{
            "overall_score": 7.5,
            "overall_feedback": "Strong fundamentals, room to grow on articulation.",
            "strengths": ["clear explanations", "solid debugging process", "good pacing"],
            "improvement_areas": [
                {"area": "verbal_clarity", "weakness": "long pauses", "suggestion": "summarize before answering"},
                {"area": "technical_depth", "weakness": "surface-level on indexing", "suggestion": "review B-tree internals"},
                {"area": "confidence", "weakness": "hedged answers", "suggestion": "commit to a position, then qualify"}
            ],
            "next_steps": ["mock interview weekly", "record and review answers", "study system design patterns"]
        }"#;
        let draft: FeedbackDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.strengths.len(), 3);
        assert_eq!(draft.improvement_areas.len(), 3);
        assert_eq!(draft.next_steps.len(), 3);
        assert_eq!(draft.improvement_areas[0].area, "verbal_clarity");
    }
}
