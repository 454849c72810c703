//! Ephemeral pending-session storage.
//!
//! A `PendingSession` lives in the cache from the moment scheduling succeeds
//! until the provider's report consumes it, the user ends it, or the TTL
//! lapses and the cache evicts it. Nothing else reads or writes these entries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An interview that has been scheduled but not yet completed or abandoned.
///
/// `expires_at` mirrors the physical TTL on the cache entry; validation treats
/// cache absence as the single source of truth and never inspects this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSession {
    pub session_token: Uuid,
    pub user_id: Uuid,
    /// Minted at scheduling time and carried through to the persisted record,
    /// so both lifecycle phases share identity.
    pub interview_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

/// Key-value store with per-key TTL holding pending sessions, keyed by the
/// opaque session token. Injected so tests can substitute an in-memory fake.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Writes the session under its token with the given expiry.
    async fn put(&self, session: &PendingSession, ttl_secs: u64) -> Result<()>;

    /// Returns the session if the token is present and unexpired.
    async fn get(&self, session_token: Uuid) -> Result<Option<PendingSession>>;

    /// Deletes the entry. Returns whether an entry existed.
    async fn remove(&self, session_token: Uuid) -> Result<bool>;
}

fn session_key(session_token: Uuid) -> String {
    format!("interview:{session_token}")
}

/// Redis-backed implementation. Relies on Redis expiring the key at the TTL
/// and on DEL being visible to subsequent GETs, which is the only
/// serialization the coordinator assumes.
pub struct RedisSessionCache {
    client: redis::Client,
}

impl RedisSessionCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn put(&self, session: &PendingSession, ttl_secs: u64) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")?;
        let payload = serde_json::to_string(session)?;
        conn.set_ex::<_, _, ()>(session_key(session.session_token), payload, ttl_secs)
            .await
            .context("failed to write pending session")?;
        Ok(())
    }

    async fn get(&self, session_token: Uuid) -> Result<Option<PendingSession>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")?;
        let payload: Option<String> = conn
            .get(session_key(session_token))
            .await
            .context("failed to read pending session")?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, session_token: Uuid) -> Result<bool> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")?;
        let deleted: i64 = conn
            .del(session_key(session_token))
            .await
            .context("failed to delete pending session")?;
        Ok(deleted > 0)
    }
}
