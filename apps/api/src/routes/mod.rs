pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::feedback;
use crate::session;
use crate::state::AppState;
use crate::techstack;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/auth/register", post(auth::handlers::handle_register))
        .route("/auth/login", post(auth::handlers::handle_login))
        .route(
            "/auth/forgot-password",
            post(auth::handlers::handle_forgot_password),
        )
        .route(
            "/auth/reset-password",
            post(auth::handlers::handle_reset_password),
        )
        // Interview session lifecycle
        .route("/schedule", post(session::handlers::handle_schedule))
        .route(
            "/validate/:session_token",
            get(session::handlers::handle_validate),
        )
        .route(
            "/vapi-end-of-call",
            post(session::handlers::handle_end_of_call),
        )
        .route(
            "/end-interview/:session_token",
            post(session::handlers::handle_end_interview),
        )
        .route(
            "/interview/start",
            post(session::handlers::handle_start_interview),
        )
        // Prompt generation
        .route(
            "/prompts/generate",
            post(techstack::handlers::handle_generate_prompt),
        )
        .route("/prompts", get(techstack::handlers::handle_list_prompts))
        .route(
            "/prompts/:prompt_id",
            get(techstack::handlers::handle_get_prompt),
        )
        // Feedback
        .route(
            "/feedback/generate",
            post(feedback::handlers::handle_generate_feedback),
        )
        .route(
            "/feedback/:interview_id",
            get(feedback::handlers::handle_get_feedback),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmClient;
    use crate::session::cache::memory::MemorySessionCache;
    use crate::session::coordinator::InterviewCoordinator;
    use crate::session::store::memory::MemoryInterviewStore;
    use crate::state::AppState;
    use crate::vapi::VapiClient;

    /// Router wired to in-memory session fakes. The database pool is lazy and
    /// never connected — these tests only cover paths that stay on the
    /// coordinator.
    fn test_router(user_id: Uuid) -> Router {
        let config = Config {
            database_url: "postgres://localhost/vocalis_test".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            anthropic_api_key: "test-key".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_expire_minutes: 30,
            vapi_base_url: "http://127.0.0.1:1".to_string(),
            vapi_org_id: "org".to_string(),
            vapi_private_key: "provider-secret".to_string(),
            vapi_assistant_id: "assistant".to_string(),
            frontend_base_url: "http://localhost:5173".to_string(),
            smtp: None,
            port: 8080,
            rust_log: "info".to_string(),
        };

        let coordinator = Arc::new(InterviewCoordinator::new(
            Arc::new(MemorySessionCache::default()),
            Arc::new(MemoryInterviewStore::with_user(user_id)),
        ));

        let state = AppState {
            db: sqlx::postgres::PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            redis: redis::Client::open(config.redis_url.clone()).unwrap(),
            llm: LlmClient::new(config.anthropic_api_key.clone()),
            vapi: VapiClient::new(
                config.vapi_base_url.clone(),
                config.vapi_org_id.clone(),
                config.vapi_private_key.clone(),
                config.vapi_assistant_id.clone(),
            ),
            mailer: None,
            coordinator,
            config,
        };

        build_router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let router = test_router(Uuid::new_v4());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_schedule_without_association_is_400() {
        let user_id = Uuid::new_v4();
        let router = test_router(user_id);
        let response = router
            .oneshot(post_json("/schedule", json!({ "user_id": user_id })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_unknown_token_is_400() {
        let router = test_router(Uuid::new_v4());
        let response = router
            .oneshot(
                Request::get(format!("/validate/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_SESSION");
    }

    #[tokio::test]
    async fn test_webhook_with_invalid_json_is_400() {
        let router = test_router(Uuid::new_v4());
        let response = router
            .oneshot(
                Request::post("/vapi-end-of-call")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MALFORMED_PAYLOAD");
    }

    #[tokio::test]
    async fn test_full_session_lifecycle_over_http() {
        let user_id = Uuid::new_v4();
        let router = test_router(user_id);

        // Schedule
        let response = router
            .clone()
            .oneshot(post_json(
                "/schedule",
                json!({ "user_id": user_id, "prompt_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let interview_id = body["interview_id"].as_str().unwrap().to_string();
        let session_token = body["session_token"].as_str().unwrap().to_string();

        // Validate round-trips
        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/validate/{session_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["interview_data"]["interview_id"], interview_id);

        // Provider reports completion
        let response = router
            .clone()
            .oneshot(post_json(
                "/vapi-end-of-call",
                json!({
                    "message": {
                        "transcript": "AI: ...",
                        "analysis": { "successEvaluation": "9" },
                        "assistant": { "variableValues": { "sessionToken": session_token } }
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["interview_id"], interview_id);
        assert_eq!(body["success_evaluation"], 9);

        // The token is consumed
        let response = router
            .oneshot(
                Request::get(format!("/validate/{session_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_end_interview_then_late_report_is_rejected() {
        let user_id = Uuid::new_v4();
        let router = test_router(user_id);

        let response = router
            .clone()
            .oneshot(post_json(
                "/schedule",
                json!({ "user_id": user_id, "resume_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        let session_token = body["session_token"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(post_json(
                &format!("/end-interview/{session_token}"),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(post_json(
                "/vapi-end-of-call",
                json!({
                    "message": {
                        "assistant": { "variableValues": { "sessionToken": session_token } }
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_SESSION");
    }
}
