//! Parsing of the voice provider's end-of-call webhook body.
//!
//! The payload is unauthenticated JSON with the shape
//! `message.{analysis,assistant,artifact,startedAt,endedAt,...}`. Only the
//! session token is required; every other field degrades to a default so a
//! sparse report is never rejected outright.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;

/// The provider's account of what happened during the call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReport {
    pub session_token: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: i32,
    pub transcript: String,
    pub summary: String,
    pub recording_url: Option<String>,
    pub video_recording_url: Option<String>,
    pub success_evaluation: i32,
}

/// Extracts a `CallReport` from the raw webhook body.
///
/// Fails with `MalformedPayload` only when the nested session token is
/// missing or not a UUID. Missing timestamps fall back to `now`, matching
/// what the provider sends for calls it could not fully analyze.
pub fn parse_report(payload: &Value, now: DateTime<Utc>) -> Result<CallReport, AppError> {
    let message = payload
        .get("message")
        .ok_or_else(|| AppError::MalformedPayload("missing 'message' object".to_string()))?;

    let token_str = message
        .pointer("/assistant/variableValues/sessionToken")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::MalformedPayload(
                "missing 'message.assistant.variableValues.sessionToken'".to_string(),
            )
        })?;
    let session_token = Uuid::parse_str(token_str)
        .map_err(|_| AppError::MalformedPayload("session token is not a valid UUID".to_string()))?;

    let started_at = parse_timestamp(message.get("startedAt")).unwrap_or(now);
    let ended_at = parse_timestamp(message.get("endedAt")).unwrap_or(now);

    let duration_seconds = message
        .get("durationSeconds")
        .and_then(Value::as_f64)
        .map(|secs| secs.round() as i32)
        .unwrap_or(0);

    let transcript = string_field(message.get("transcript"));
    let summary = string_field(message.pointer("/analysis/summary"));
    let recording_url = optional_string(message.get("recordingUrl"));
    let video_recording_url = optional_string(message.pointer("/artifact/videoRecordingUrl"));

    // Never reject a report for a missing or non-numeric score.
    let success_evaluation = parse_success_evaluation(message.pointer("/analysis/successEvaluation"));

    Ok(CallReport {
        session_token,
        started_at,
        ended_at,
        duration_seconds,
        transcript,
        summary,
        recording_url,
        video_recording_url,
        success_evaluation,
    })
}

fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn string_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// The provider sends the score as a bare number, a numeric string, or not
/// at all. Anything unparseable counts as 0.
fn parse_success_evaluation(value: Option<&Value>) -> i32 {
    match value {
        Some(Value::Number(n)) => n.as_i64().map(|v| v as i32).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i32>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_payload(token: Uuid) -> Value {
        json!({
            "message": {
                "startedAt": "2025-06-01T10:00:00Z",
                "endedAt": "2025-06-01T10:12:30Z",
                "durationSeconds": 750.4,
                "transcript": "AI: Hello...\nUser: Hi...",
                "recordingUrl": "https://cdn.example.com/calls/abc.mp3",
                "analysis": {
                    "summary": "Candidate explained caching strategies well.",
                    "successEvaluation": "8"
                },
                "assistant": {
                    "variableValues": { "sessionToken": token.to_string() }
                },
                "artifact": {
                    "videoRecordingUrl": "https://cdn.example.com/calls/abc.mp4"
                }
            }
        })
    }

    #[test]
    fn test_parses_full_report() {
        let token = Uuid::new_v4();
        let report = parse_report(&sample_payload(token), Utc::now()).unwrap();

        assert_eq!(report.session_token, token);
        assert_eq!(report.duration_seconds, 750);
        assert_eq!(report.success_evaluation, 8);
        assert_eq!(report.summary, "Candidate explained caching strategies well.");
        assert_eq!(
            report.recording_url.as_deref(),
            Some("https://cdn.example.com/calls/abc.mp3")
        );
        assert_eq!(
            report.video_recording_url.as_deref(),
            Some("https://cdn.example.com/calls/abc.mp4")
        );
    }

    #[test]
    fn test_missing_session_token_is_malformed() {
        let payload = json!({ "message": { "transcript": "hello" } });
        let err = parse_report(&payload, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn test_missing_message_is_malformed() {
        let err = parse_report(&json!({}), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn test_non_uuid_token_is_malformed() {
        let payload = json!({
            "message": {
                "assistant": { "variableValues": { "sessionToken": "not-a-uuid" } }
            }
        });
        let err = parse_report(&payload, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let token = Uuid::new_v4();
        let mut payload = sample_payload(token);
        payload["message"]["analysis"]
            .as_object_mut()
            .unwrap()
            .remove("successEvaluation");

        let report = parse_report(&payload, Utc::now()).unwrap();
        assert_eq!(report.success_evaluation, 0);
    }

    #[test]
    fn test_non_numeric_score_defaults_to_zero() {
        let token = Uuid::new_v4();
        let mut payload = sample_payload(token);
        payload["message"]["analysis"]["successEvaluation"] = json!("excellent");

        let report = parse_report(&payload, Utc::now()).unwrap();
        assert_eq!(report.success_evaluation, 0);
    }

    #[test]
    fn test_numeric_score_accepted() {
        let token = Uuid::new_v4();
        let mut payload = sample_payload(token);
        payload["message"]["analysis"]["successEvaluation"] = json!(7);

        let report = parse_report(&payload, Utc::now()).unwrap();
        assert_eq!(report.success_evaluation, 7);
    }

    #[test]
    fn test_missing_timestamps_fall_back_to_now() {
        let token = Uuid::new_v4();
        let payload = json!({
            "message": {
                "assistant": { "variableValues": { "sessionToken": token.to_string() } }
            }
        });
        let now = Utc::now();

        let report = parse_report(&payload, now).unwrap();
        assert_eq!(report.started_at, now);
        assert_eq!(report.ended_at, now);
        assert_eq!(report.duration_seconds, 0);
        assert_eq!(report.transcript, "");
        assert_eq!(report.recording_url, None);
    }
}
