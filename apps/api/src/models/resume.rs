#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored resume, referenced by resume-driven interviews.
/// Upload and parsing happen out of band; this service only reads the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub resume_id: Uuid,
    pub user_id: Uuid,
    pub resume_data: Option<Value>,
    pub uploaded_at: DateTime<Utc>,
}
