//! Thin client for the third-party voice-interview provider.
//!
//! Signs short-lived org tokens and relays call-start requests. The provider
//! reports call completion asynchronously via the `/vapi-end-of-call`
//! webhook, which is handled by the session coordinator — this module never
//! touches the cache or the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;

/// Provider org tokens are valid for one hour.
const TOKEN_TTL_HOURS: i64 = 1;

/// System message for resume-driven interviews, where no generated prompt
/// supplies one.
const DEFAULT_SYSTEM_MESSAGE: &str = "You are a senior technical interviewer conducting a \
    voice-based mock interview. Ask the candidate to walk through their experience and probe \
    for depth on the projects they describe. Keep questions verbal — never ask for written code.";

#[derive(Debug, Serialize)]
struct ProviderClaims {
    #[serde(rename = "orgId")]
    org_id: String,
    exp: usize,
}

#[derive(Clone)]
pub struct VapiClient {
    http: reqwest::Client,
    base_url: String,
    org_id: String,
    private_key: String,
    assistant_id: String,
}

impl VapiClient {
    pub fn new(base_url: String, org_id: String, private_key: String, assistant_id: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            org_id,
            private_key,
            assistant_id,
        }
    }

    /// Signs a short-lived HS256 token for the provider API.
    pub fn issue_token(&self) -> Result<String, AppError> {
        let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let claims = ProviderClaims {
            org_id: self.org_id.clone(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.private_key.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.into()))
    }

    /// Starts a voice call for a validated session. The session token rides
    /// along as an assistant variable so the provider echoes it back in the
    /// end-of-call report.
    pub async fn start_call(
        &self,
        session_token: Uuid,
        username: &str,
        system_prompt: Option<&str>,
    ) -> Result<Value, AppError> {
        let token = self.issue_token()?;
        let payload = json!({
            "assistantId": self.assistant_id,
            "assistant": {
                "firstMessage": format!("Hey {username}, how are you?"),
                "model": {
                    "messages": [{
                        "role": "system",
                        "content": system_prompt.unwrap_or(DEFAULT_SYSTEM_MESSAGE)
                    }]
                },
                "variableValues": { "sessionToken": session_token }
            }
        });

        let response = self
            .http
            .post(format!("{}/interview/start", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("status {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))
    }
}
