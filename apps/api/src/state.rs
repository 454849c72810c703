use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::mailer::Mailer;
use crate::session::coordinator::InterviewCoordinator;
use crate::vapi::VapiClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Raw Redis client for ambient short-lived keys (password reset tokens).
    /// Pending interview sessions go through the coordinator's cache seam.
    pub redis: RedisClient,
    pub llm: LlmClient,
    pub vapi: VapiClient,
    /// Absent when SMTP is not configured; reset tokens are then only logged.
    pub mailer: Option<Mailer>,
    /// Owns the interview session lifecycle: cache-backed scheduling,
    /// webhook reconciliation, exactly-once persistence.
    pub coordinator: Arc<InterviewCoordinator>,
    pub config: Config,
}
