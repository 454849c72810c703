use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A completed interview, written exactly once per `interview_id` when the
/// provider's end-of-call report is reconciled. Timing and content come from
/// the provider; identity and provenance come from the pending session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub interview_id: Uuid,
    pub user_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock length of the voice call in seconds, as reported.
    pub duration: i32,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub recording_url: Option<String>,
    pub video_recording_url: Option<String>,
    /// Provider's own 0-10 assessment of the call.
    pub success_evaluation: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Coach feedback derived from a completed interview. 1:1 optional with
/// `InterviewRow`; never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewFeedbackRow {
    pub feedback_id: Uuid,
    pub interview_id: Uuid,
    pub overall_score: f64,
    pub overall_feedback: String,
    pub strengths: Vec<String>,
    /// JSONB list of `{area, weakness, suggestion}` objects.
    pub improvement_areas: Value,
    pub next_steps: Vec<String>,
    pub created_at: DateTime<Utc>,
}
