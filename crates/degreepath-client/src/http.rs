//! TutorClient -- concrete [`TutorTransport`] implementation over HTTP.
//!
//! Wraps a shared `reqwest::Client` configured with connect and read
//! timeouts so a stalled stream (including an endless wait for the first
//! byte) surfaces as a transport failure instead of hanging the turn.
//! Non-success statuses are mapped to [`TutorError`] before any body is
//! consumed as a stream.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::warn;

use degreepath_core::transport::TutorTransport;
use degreepath_types::chat::{ChatHistory, ChatReply, ClearReceipt, TurnRequest};
use degreepath_types::config::ClientConfig;
use degreepath_types::error::TutorError;
use degreepath_types::student::{ServiceHealth, StudentProfile};

/// HTTP client for the Tutor Service.
#[derive(Debug, Clone)]
pub struct TutorClient {
    http: reqwest::Client,
    base_url: String,
}

impl TutorClient {
    /// Create a client from connection settings.
    pub fn new(config: &ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status and decode a buffered JSON response body.
    async fn expect_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TutorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }
        response
            .json()
            .await
            .map_err(|e| TutorError::Deserialization(format!("failed to parse response: {e}")))
    }

    // --- Buffered endpoints ---

    /// Send one turn through the non-streaming chat endpoint.
    pub async fn chat(&self, request: &TurnRequest) -> Result<ChatReply, TutorError> {
        let response = self
            .http
            .post(self.url("/chat"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }

    /// Service liveness probe.
    pub async fn health(&self) -> Result<ServiceHealth, TutorError> {
        let response = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }

    /// List all known students.
    pub async fn list_students(&self) -> Result<Vec<StudentProfile>, TutorError> {
        let response = self
            .http
            .get(self.url("/students"))
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }

    /// Fetch one student profile.
    pub async fn get_student(&self, student_id: &str) -> Result<StudentProfile, TutorError> {
        let response = self
            .http
            .get(self.url(&format!("/students/{student_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }

    /// Register a new student profile.
    pub async fn create_student(
        &self,
        profile: &StudentProfile,
    ) -> Result<StudentProfile, TutorError> {
        let response = self
            .http
            .post(self.url("/students"))
            .json(profile)
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }
}

impl TutorTransport for TutorClient {
    fn stream_turn(
        &self,
        request: TurnRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, TutorError>> + Send + 'static>> {
        let http = self.http.clone();
        let url = self.url("/chat/stream");

        Box::pin(async_stream::try_stream! {
            let response = http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            let response = match status.is_success() {
                true => response,
                false => {
                    let body = response.text().await.unwrap_or_default();
                    warn!(status = %status, body = %body, "streaming chat rejected");
                    Err(status_error(status.as_u16(), body))?
                }
            };
            let mut body = response.bytes_stream();

            while let Some(chunk) = body.next().await {
                let chunk = chunk
                    .map_err(|e| TutorError::Stream(format!("response body read: {e}")))?;
                yield chunk;
            }
        })
    }

    async fn fetch_history(&self, student_id: &str) -> Result<ChatHistory, TutorError> {
        let response = self
            .http
            .get(self.url(&format!("/chat/{student_id}/history")))
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }

    async fn clear_history(&self, student_id: &str) -> Result<ClearReceipt, TutorError> {
        let response = self
            .http
            .delete(self.url(&format!("/chat/{student_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        Self::expect_json(response).await
    }
}

/// Map a reqwest-level failure (refused, reset, timed out) to the error
/// taxonomy.
fn transport_error(err: reqwest::Error) -> TutorError {
    TutorError::Transport(format!("HTTP request failed: {err}"))
}

/// Map a non-success status to the error taxonomy.
///
/// The service answers 404 on every per-student route when the student is
/// unknown, so that status gets its own variant.
fn status_error(status: u16, body: String) -> TutorError {
    match status {
        404 => TutorError::StudentNotFound,
        _ => TutorError::Status { status, body },
    }
}
