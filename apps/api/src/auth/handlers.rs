//! Axum route handlers for registration, login, and password reset.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::tokens::create_access_token;
use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

/// Password-reset tokens live for one hour.
const RESET_TOKEN_TTL_SECS: u64 = 60 * 60;

fn reset_key(token: &str) -> String {
    format!("reset:{token}")
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if request.username.trim().len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if request.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let existing: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE username = $1 OR email = $2")
            .bind(&request.username)
            .bind(&request.email)
            .fetch_optional(&state.db)
            .await?;
    if let Some(existing) = existing {
        let field = if existing.username == request.username {
            "Username"
        } else {
            "Email"
        };
        return Err(AppError::Validation(format!("{field} already registered")));
    }

    let hashed_password = hash_password(&request.password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (user_id, username, email, hashed_password, role, is_active, created_at)
        VALUES ($1, $2, $3, $4, 'USER', true, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.username)
    .bind(&request.email)
    .bind(&hashed_password)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id = %user.user_id, "User registered");

    Ok(Json(UserResponse {
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;
    // Same error for unknown email and wrong password.
    let user = user.ok_or(AppError::Unauthorized)?;

    verify_password(&request.password, &user.hashed_password)?;

    let access_token = create_access_token(
        user.user_id,
        user.role,
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /auth/forgot-password
///
/// Always answers 200 so the endpoint cannot be used for email enumeration.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let response = json!({
        "message": "If your email is registered, you will receive a password reset link."
    });

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;
    let Some(user) = user else {
        tracing::info!("Password reset requested for unknown email");
        return Ok(Json(response));
    };

    let token = Uuid::new_v4().simple().to_string();
    let mut conn = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Cache(e.into()))?;
    conn.set_ex::<_, _, ()>(reset_key(&token), &user.email, RESET_TOKEN_TTL_SECS)
        .await
        .map_err(|e| AppError::Cache(e.into()))?;

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.frontend_base_url, token
    );
    match &state.mailer {
        Some(mailer) => {
            // Delivery is best-effort; failures are logged, never surfaced.
            if let Err(e) = mailer.send_password_reset(&user.email, &reset_url).await {
                tracing::error!("Failed to send password reset email: {e}");
            }
        }
        None => tracing::warn!("SMTP not configured; password reset token: {token}"),
    }

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// POST /auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    if request.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let mut conn = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Cache(e.into()))?;
    let email: Option<String> = conn
        .get(reset_key(&request.token))
        .await
        .map_err(|e| AppError::Cache(e.into()))?;
    let email = email
        .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

    let hashed_password = hash_password(&request.password)?;
    sqlx::query("UPDATE users SET hashed_password = $1 WHERE email = $2")
        .bind(&hashed_password)
        .bind(&email)
        .execute(&state.db)
        .await?;

    conn.del::<_, ()>(reset_key(&request.token))
        .await
        .map_err(|e| AppError::Cache(e.into()))?;

    tracing::info!("Password reset completed");

    Ok(Json(json!({ "message": "Password has been reset successfully." })))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hashed: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored hash is invalid: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trips() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("hunter22").unwrap();
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AppError::Unauthorized)
        ));
    }
}
