use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub vapi_base_url: String,
    pub vapi_org_id: String,
    pub vapi_private_key: String,
    pub vapi_assistant_id: String,
    pub frontend_base_url: String,
    pub smtp: Option<SmtpConfig>,
    pub port: u16,
    pub rust_log: String,
}

/// SMTP settings for outbound mail. Optional as a block — when `SMTP_HOST`
/// is unset, mail delivery is disabled and reset tokens are only logged.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                username: require_env("SMTP_USERNAME")?,
                password: require_env("SMTP_PASSWORD")?,
                from: require_env("SMTP_FROM")?,
            }),
            Err(_) => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            access_token_expire_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")?,
            vapi_base_url: require_env("VAPI_BASE_URL")?,
            vapi_org_id: require_env("VAPI_ORG_ID")?,
            vapi_private_key: require_env("VAPI_PRIVATE_KEY")?,
            vapi_assistant_id: require_env("VAPI_ASSISTANT_ID")?,
            frontend_base_url: std::env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            smtp,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
