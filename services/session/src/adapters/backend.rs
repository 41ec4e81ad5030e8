//! services/session/src/adapters/backend.rs
//!
//! This module contains the backend adapter, which is the concrete
//! implementation of the `BackendService` port from the `core` crate. It
//! speaks the recruitment platform's public, token-scoped HTTP contract
//! using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interview_session_core::domain::{
    AssignedQuestion, InterviewSnapshot, InterviewStatus, SessionToken,
};
use interview_session_core::ports::{BackendService, PortError, PortResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A backend adapter that implements the `BackendService` port over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` rooted at the API base path
    /// (e.g. `http://localhost:3000/api/v1`).
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct InterviewRecord {
    scheduled_at: DateTime<Utc>,
    duration_minutes: Option<i64>,
    status: String,
    #[serde(default)]
    token_revoke: bool,
}

impl InterviewRecord {
    fn to_domain(self) -> InterviewSnapshot {
        let status = match self.status.as_str() {
            "completed" => InterviewStatus::Completed,
            "cancelled" => InterviewStatus::Cancelled,
            _ => InterviewStatus::Scheduled,
        };
        InterviewSnapshot {
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            status,
            token_revoked: self.token_revoke,
        }
    }
}

#[derive(Deserialize)]
struct QuestionPrompt {
    question: Option<String>,
}

#[derive(Deserialize)]
struct QuestionRecord {
    id: Uuid,
    #[serde(default)]
    q_timer: Option<u64>,
    #[serde(default)]
    q_answer: Option<String>,
    /// The assigned prompt joined in from the question bank.
    questions: Option<QuestionPrompt>,
}

impl QuestionRecord {
    fn to_domain(self) -> AssignedQuestion {
        AssignedQuestion {
            id: self.id,
            prompt: self
                .questions
                .and_then(|q| q.question)
                .unwrap_or_else(|| "No question text available".to_string()),
            // A zero override means "use the default".
            timer_secs: self.q_timer.filter(|t| *t > 0),
            answer: self.q_answer.filter(|a| !a.trim().is_empty()),
        }
    }
}

#[derive(Serialize)]
struct VerifyPinBody<'a> {
    pin: &'a str,
}

#[derive(Serialize)]
struct SubmitAnswerBody<'a> {
    token: &'a str,
    q_answer: &'a str,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps an HTTP failure status plus the server's `{error}` message onto the
/// port error taxonomy. 404 is a missing/mismatched record, 401 a revoked
/// token or rejected PIN (the server's message rides along when present);
/// everything else is unexpected.
fn map_error(status: StatusCode, message: Option<String>) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized(message),
        StatusCode::NOT_FOUND => PortError::NotFound(
            message.unwrap_or_else(|| format!("Request failed with status {status}")),
        ),
        _ => PortError::Unexpected(
            message.unwrap_or_else(|| format!("Request failed with status {status}")),
        ),
    }
}

impl HttpBackend {
    /// Resolves a response into `Ok` or the mapped port error. The error body
    /// is best-effort: a non-JSON body falls back to a status-derived message.
    async fn check(&self, response: reqwest::Response) -> PortResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.json::<ErrorBody>().await.ok().map(|b| b.error);
        Err(map_error(status, message))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> PortResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.check(response).await
    }
}

//=========================================================================================
// `BackendService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendService for HttpBackend {
    async fn fetch_interview(&self, token: &SessionToken) -> PortResult<InterviewSnapshot> {
        let url = self.url(&format!("/interviews/token/{}", token.as_str()));
        let response = self.send(self.client.get(url)).await?;
        let record = response
            .json::<InterviewRecord>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn fetch_questions(&self, token: &SessionToken) -> PortResult<Vec<AssignedQuestion>> {
        let url = self.url(&format!("/interview-questions/token/{}", token.as_str()));
        let response = self.send(self.client.get(url)).await?;
        let records = response
            .json::<Vec<QuestionRecord>>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(QuestionRecord::to_domain).collect())
    }

    async fn verify_pin(&self, token: &SessionToken, pin: &str) -> PortResult<()> {
        let url = self.url(&format!("/interviews/token/{}/verify-pin", token.as_str()));
        self.send(self.client.post(url).json(&VerifyPinBody { pin }))
            .await?;
        Ok(())
    }

    async fn submit_answer(
        &self,
        question_id: Uuid,
        token: &SessionToken,
        answer: &str,
    ) -> PortResult<()> {
        let url = self.url(&format!("/interview-questions/{question_id}/answer"));
        let body = SubmitAnswerBody {
            token: token.as_str(),
            q_answer: answer,
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn complete_interview(&self, token: &SessionToken) -> PortResult<()> {
        let url = self.url(&format!("/interviews/token/{}/complete", token.as_str()));
        self.send(self.client.post(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_the_server_message() {
        let err = map_error(StatusCode::NOT_FOUND, Some("Interview not found".into()));
        match err {
            PortError::NotFound(message) => assert_eq!(message, "Interview not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn unauthorized_keeps_the_server_message() {
        match map_error(StatusCode::UNAUTHORIZED, Some("PIN has expired".into())) {
            PortError::Unauthorized(message) => {
                assert_eq!(message.as_deref(), Some("PIN has expired"));
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        assert!(matches!(
            map_error(StatusCode::UNAUTHORIZED, None),
            PortError::Unauthorized(None)
        ));
    }

    #[test]
    fn other_statuses_are_unexpected_with_fallback_message() {
        match map_error(StatusCode::INTERNAL_SERVER_ERROR, None) {
            PortError::Unexpected(message) => {
                assert!(message.contains("500"));
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn interview_record_parses_the_wire_shape() {
        let record: InterviewRecord = serde_json::from_str(
            r#"{
                "id": "5f4c5d44-93a8-43a9-8f20-54c3a9a1a111",
                "scheduled_at": "2025-06-02T14:00:00Z",
                "duration_minutes": 45,
                "status": "scheduled"
            }"#,
        )
        .unwrap();
        let snapshot = record.to_domain();
        assert_eq!(snapshot.status, InterviewStatus::Scheduled);
        assert_eq!(snapshot.duration_minutes, Some(45));
        // Absent revocation flag defaults to not revoked.
        assert!(!snapshot.token_revoked);
    }

    #[test]
    fn question_record_parses_the_nested_prompt() {
        let record: QuestionRecord = serde_json::from_str(
            r#"{
                "id": "0a4f4b0e-2f63-4a05-9b8f-0d3f3dd8c222",
                "q_timer": 90,
                "q_answer": null,
                "questions": { "question": "Why this role?" }
            }"#,
        )
        .unwrap();
        let question = record.to_domain();
        assert_eq!(question.prompt, "Why this role?");
        assert_eq!(question.timer_secs, Some(90));
        assert_eq!(question.answer, None);
    }

    #[test]
    fn question_record_mapping_normalizes_timer_and_answer() {
        let record = QuestionRecord {
            id: Uuid::new_v4(),
            q_timer: Some(0),
            q_answer: Some("   ".into()),
            questions: None,
        };
        let question = record.to_domain();
        assert_eq!(question.timer_secs, None);
        assert_eq!(question.answer, None);
        assert_eq!(question.prompt, "No question text available");
    }

    #[test]
    fn interview_record_mapping_recognizes_statuses() {
        let record = InterviewRecord {
            scheduled_at: Utc::now(),
            duration_minutes: Some(45),
            status: "completed".into(),
            token_revoke: false,
        };
        assert_eq!(record.to_domain().status, InterviewStatus::Completed);
    }
}
