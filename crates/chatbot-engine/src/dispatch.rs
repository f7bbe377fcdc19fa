//! Remote dispatcher for the chat endpoint.
//!
//! One request per submitted message: `POST {model, user_message}` and a
//! `{response}` body back. No retry, no streaming.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default chat endpoint of the local inference service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";

/// Errors from a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection, TLS, or timeout failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Chat endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not a `{"response": string}` object.
    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Request body sent to the chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub user_message: &'a str,
}

/// Response body expected from the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Sends one user message to a model and returns the reply text.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, model: &str, user_message: &str) -> Result<String, DispatchError>;
}

/// [`Dispatcher`] backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpDispatcher {
    /// Create a dispatcher for `endpoint`.
    ///
    /// `timeout` of `None` waits for the service indefinitely.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DispatchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, model: &str, user_message: &str) -> Result<String, DispatchError> {
        let start = std::time::Instant::now();
        let body = ChatRequest {
            model,
            user_message,
        };

        let resp = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(DispatchError::Decode)?;

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(model, duration_ms, "Chat endpoint replied");

        Ok(parsed.response)
    }
}
