use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use vista_types::{ClearRequest, ErrorBody, ImageResponse, PromptRequest};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Try again.";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    /// Non-success status. `message` is the server's `error` text when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// The three calls a thread UI makes against the pipeline.
#[async_trait]
pub trait ThreadTransport: Send + Sync {
    async fn generate(&self, request: PromptRequest) -> Result<ImageResponse, TransportError>;

    async fn refine(&self, request: PromptRequest) -> Result<ImageResponse, TransportError>;

    async fn clear(&self, request: ClearRequest) -> Result<(), TransportError>;
}

/// JSON-over-HTTP transport for a running Vista server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response, TransportError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.error)
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());

        tracing::debug!(path, status, message = %message, "Request rejected");
        Err(TransportError::Status { status, message })
    }

    async fn post_prompt(&self, path: &str, request: PromptRequest) -> Result<ImageResponse, TransportError> {
        let body = serde_json::to_value(&request).map_err(|e| TransportError::Decode(e.to_string()))?;
        self.post(path, body)
            .await?
            .json::<ImageResponse>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ThreadTransport for HttpTransport {
    async fn generate(&self, request: PromptRequest) -> Result<ImageResponse, TransportError> {
        self.post_prompt("/api/generate", request).await
    }

    async fn refine(&self, request: PromptRequest) -> Result<ImageResponse, TransportError> {
        self.post_prompt("/api/refine", request).await
    }

    async fn clear(&self, request: ClearRequest) -> Result<(), TransportError> {
        let body = serde_json::to_value(&request).map_err(|e| TransportError::Decode(e.to_string()))?;
        self.post("/api/clear", body).await.map(|_| ())
    }
}
