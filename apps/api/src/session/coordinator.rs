//! Interview session coordinator.
//!
//! Owns the lifecycle of an interview between scheduling and completion:
//! scheduling writes a `PendingSession` into the cache under a fresh token,
//! the provider's end-of-call report consumes that token and persists the
//! finished interview exactly once, and an explicit end (or the TTL) discards
//! the pending entry without touching durable storage.
//!
//! Failure handling is fail-fast throughout — retries belong to the callers
//! (the provider re-sends webhooks; clients re-invoke scheduling).

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::cache::{PendingSession, SessionCache};
use crate::session::report::parse_report;
use crate::session::store::{InterviewRecord, InterviewStore};

/// How long a scheduled session stays claimable before the cache evicts it.
pub const SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledSession {
    pub interview_id: Uuid,
    pub session_token: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub interview_id: Uuid,
    pub success_evaluation: i32,
}

pub struct InterviewCoordinator {
    cache: Arc<dyn SessionCache>,
    store: Arc<dyn InterviewStore>,
}

impl InterviewCoordinator {
    pub fn new(cache: Arc<dyn SessionCache>, store: Arc<dyn InterviewStore>) -> Self {
        Self { cache, store }
    }

    /// Schedules an interview for a user against exactly one of a prompt or
    /// a resume. Mints the interview identity up front and parks a pending
    /// session in the cache; durable storage is untouched until the
    /// provider reports back.
    pub async fn schedule(
        &self,
        user_id: Uuid,
        prompt_id: Option<Uuid>,
        resume_id: Option<Uuid>,
    ) -> Result<ScheduledSession, AppError> {
        match (prompt_id, resume_id) {
            (None, None) => {
                return Err(AppError::Validation(
                    "Either prompt_id or resume_id must be provided".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "Provide only one of prompt_id or resume_id".to_string(),
                ))
            }
            _ => {}
        }

        let exists = self
            .store
            .user_exists(user_id)
            .await
            .map_err(AppError::Internal)?;
        if !exists {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }

        let session = PendingSession {
            session_token: Uuid::new_v4(),
            user_id,
            interview_id: Uuid::new_v4(),
            prompt_id,
            resume_id,
            expires_at: Utc::now() + Duration::seconds(SESSION_TTL_SECS as i64),
        };

        self.cache
            .put(&session, SESSION_TTL_SECS)
            .await
            .map_err(AppError::Cache)?;

        tracing::info!(
            interview_id = %session.interview_id,
            user_id = %user_id,
            "Interview scheduled"
        );

        Ok(ScheduledSession {
            interview_id: session.interview_id,
            session_token: session.session_token,
        })
    }

    /// Read-only lookup of a pending session by token. Absence covers
    /// "never existed", "already consumed", and "TTL elapsed" uniformly.
    pub async fn validate_session(&self, session_token: Uuid) -> Result<PendingSession, AppError> {
        self.cache
            .get(session_token)
            .await
            .map_err(AppError::Cache)?
            .ok_or(AppError::InvalidSession)
    }

    /// Reconciles the provider's end-of-call report against the pending
    /// session it names, persists the finished interview, and consumes the
    /// token.
    ///
    /// Persistence and deletion form one logical completion: a failed insert
    /// leaves the cache entry intact so the provider's retry can be
    /// reconciled again, and a successful insert is always followed by the
    /// delete that makes a replayed webhook land in the "absent" case.
    pub async fn handle_report(&self, payload: &Value) -> Result<ReportOutcome, AppError> {
        let report = parse_report(payload, Utc::now())?;

        let pending = self
            .cache
            .get(report.session_token)
            .await
            .map_err(AppError::Cache)?
            .ok_or(AppError::InvalidSession)?;

        let record = InterviewRecord {
            interview_id: pending.interview_id,
            user_id: pending.user_id,
            prompt_id: pending.prompt_id,
            resume_id: pending.resume_id,
            start_time: report.started_at,
            end_time: report.ended_at,
            duration_seconds: report.duration_seconds,
            transcript: report.transcript,
            summary: report.summary,
            recording_url: report.recording_url,
            video_recording_url: report.video_recording_url,
            success_evaluation: report.success_evaluation,
        };

        self.store
            .insert_interview(&record)
            .await
            .map_err(AppError::Persistence)?;

        self.cache
            .remove(report.session_token)
            .await
            .map_err(AppError::Cache)?;

        tracing::info!(
            interview_id = %pending.interview_id,
            success_evaluation = record.success_evaluation,
            "Interview report reconciled"
        );

        Ok(ReportOutcome {
            interview_id: pending.interview_id,
            success_evaluation: record.success_evaluation,
        })
    }

    /// User-initiated early termination. Removes the pending entry so a late
    /// provider report is rejected as an invalid session; never writes an
    /// interview record.
    pub async fn end_session(&self, session_token: Uuid) -> Result<(), AppError> {
        let removed = self
            .cache
            .remove(session_token)
            .await
            .map_err(AppError::Cache)?;
        if !removed {
            return Err(AppError::InvalidSession);
        }
        tracing::info!(%session_token, "Interview session ended early");
        Ok(())
    }
}
