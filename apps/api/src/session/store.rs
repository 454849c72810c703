//! Durable interview persistence behind a narrow seam.
//!
//! The coordinator only ever checks that a user exists and appends completed
//! interviews; everything else reads the `interviews` table directly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// A finished interview ready to be written. Identity and provenance come
/// from the pending session; timing and content come from the provider report.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewRecord {
    pub interview_id: Uuid,
    pub user_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i32,
    pub transcript: String,
    pub summary: String,
    pub recording_url: Option<String>,
    pub video_recording_url: Option<String>,
    pub success_evaluation: i32,
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool>;

    /// Inserts the record. `interview_id` is the primary key, so a duplicate
    /// insert (two webhook deliveries racing the cache delete) fails loudly
    /// instead of writing a second row.
    async fn insert_interview(&self, record: &InterviewRecord) -> Result<()>;
}

pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .context("failed to look up user")?;
        Ok(exists)
    }

    async fn insert_interview(&self, record: &InterviewRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (interview_id, user_id, prompt_id, resume_id, start_time, end_time,
                 duration, transcript, summary, recording_url, video_recording_url,
                 success_evaluation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.interview_id)
        .bind(record.user_id)
        .bind(record.prompt_id)
        .bind(record.resume_id)
        .bind(record.start_time)
        .bind(record.end_time)
        .bind(record.duration_seconds)
        .bind(&record.transcript)
        .bind(&record.summary)
        .bind(&record.recording_url)
        .bind(&record.video_recording_url)
        .bind(record.success_evaluation)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("failed to insert interview record")?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    //! In-memory fake mirroring the Postgres store's contract, including the
    //! primary-key uniqueness on `interview_id` and a switchable write
    //! failure for retry tests.

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use anyhow::bail;

    use super::*;

    #[derive(Default)]
    pub struct MemoryInterviewStore {
        pub users: Mutex<HashSet<Uuid>>,
        pub interviews: Mutex<Vec<InterviewRecord>>,
        pub fail_inserts: AtomicBool,
    }

    impl MemoryInterviewStore {
        pub fn with_user(user_id: Uuid) -> Self {
            let store = Self::default();
            store.users.lock().unwrap().insert(user_id);
            store
        }

        pub fn set_fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl InterviewStore for MemoryInterviewStore {
        async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
            Ok(self.users.lock().unwrap().contains(&user_id))
        }

        async fn insert_interview(&self, record: &InterviewRecord) -> Result<()> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                bail!("simulated write failure");
            }
            let mut interviews = self.interviews.lock().unwrap();
            if interviews
                .iter()
                .any(|r| r.interview_id == record.interview_id)
            {
                bail!("duplicate key value violates unique constraint \"interviews_pkey\"");
            }
            interviews.push(record.clone());
            Ok(())
        }
    }
}
