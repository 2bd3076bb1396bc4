use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;
use crate::schemas::assessment::AssessmentDetail;
use crate::schemas::attempt::{AnswerSubmit, Attempt};

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    /// The server refused the call for this attempt (HTTP 403). For start and
    /// submit this means the attempt is already closed.
    #[error("attempt rejected: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("api error (status {status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Remote collaborator owning attempts. The server is the source of truth for
/// scoring, persistence and the attempt deadline; the client only relies on
/// `start_or_resume_attempt` being idempotent and `save_answer` upserting.
#[async_trait]
pub(crate) trait AttemptService: Send + Sync {
    async fn get_assessment(&self, assessment_id: i64) -> Result<AssessmentDetail, ServiceError>;

    /// Idempotent: repeat calls for an open attempt return the same attempt.
    /// Fails with `Forbidden` once the attempt has been submitted.
    async fn start_or_resume_attempt(&self, assessment_id: i64) -> Result<Attempt, ServiceError>;

    async fn save_answer(
        &self,
        attempt_id: i64,
        answer: &AnswerSubmit,
    ) -> Result<(), ServiceError>;

    async fn submit_attempt(&self, attempt_id: i64) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
pub(crate) struct HttpAttemptService {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpAttemptService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.api().connect_timeout_seconds))
            .timeout(Duration::from_secs(settings.api().request_timeout_seconds))
            .build()
            .context("Failed to build ExamForge HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api().base_url.trim_end_matches('/').to_string(),
            token: settings.api().token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let body = self.read_checked(builder).await?;
        serde_json::from_str(&body).map_err(|err| ServiceError::InvalidBody(err.to_string()))
    }

    async fn read_checked(&self, builder: RequestBuilder) -> Result<String, ServiceError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let detail = extract_error_detail(&body);
        match status {
            StatusCode::FORBIDDEN => Err(ServiceError::Forbidden(detail)),
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound(detail)),
            _ => Err(ServiceError::Api { status: status.as_u16(), detail }),
        }
    }
}

#[async_trait]
impl AttemptService for HttpAttemptService {
    async fn get_assessment(&self, assessment_id: i64) -> Result<AssessmentDetail, ServiceError> {
        self.read_json(self.request(Method::GET, &format!("/assessments/{assessment_id}"))).await
    }

    async fn start_or_resume_attempt(&self, assessment_id: i64) -> Result<Attempt, ServiceError> {
        self.read_json(self.request(Method::POST, &format!("/assessments/{assessment_id}/attempt")))
            .await
    }

    async fn save_answer(
        &self,
        attempt_id: i64,
        answer: &AnswerSubmit,
    ) -> Result<(), ServiceError> {
        self.read_checked(
            self.request(Method::POST, &format!("/assessments/attempts/{attempt_id}/answer"))
                .json(answer),
        )
        .await?;
        Ok(())
    }

    async fn submit_attempt(&self, attempt_id: i64) -> Result<(), ServiceError> {
        self.read_checked(
            self.request(Method::POST, &format!("/assessments/attempts/{attempt_id}/submit")),
        )
        .await?;
        Ok(())
    }
}

/// Pulls a human-readable message out of a FastAPI-style error body.
fn extract_error_detail(body: &str) -> String {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        return if body.is_empty() { "unknown_error".to_string() } else { body.to_string() };
    };

    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error")
        .to_string()
}
