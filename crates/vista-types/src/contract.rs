use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MISSING_FIELDS_MESSAGE: &str = "Prompt and threadId are required.";
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid payload.";

/// Body of `POST /api/generate` and `POST /api/refine`.
///
/// `last_image_id` and `last_seed` are the client's cached continuation pointers.
/// They are informational only: the server decides from its own thread store
/// whether a refine is legal and which image it refines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seed: Option<String>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            thread_id: Some(thread_id.into()),
            last_image_id: None,
            last_seed: None,
        }
    }

    pub fn with_continuation(mut self, last_image_id: Option<String>, last_seed: Option<String>) -> Self {
        self.last_image_id = last_image_id;
        self.last_seed = last_seed;
        self
    }

    /// Check required fields and trim the prompt.
    pub fn validate(&self) -> Result<ValidatedPrompt, ValidationError> {
        let prompt = self.prompt.as_deref().map(str::trim).unwrap_or_default();
        let thread_id = self.thread_id.as_deref().unwrap_or_default();

        if prompt.is_empty() || thread_id.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        Ok(ValidatedPrompt {
            prompt: prompt.to_string(),
            thread_id: thread_id.to_string(),
        })
    }
}

/// A prompt request that passed validation. The prompt is already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPrompt {
    pub prompt: String,
    pub thread_id: String,
}

impl ValidatedPrompt {
    pub fn new(prompt: impl Into<String>, thread_id: impl Into<String>) -> Result<Self, ValidationError> {
        PromptRequest::new(prompt, thread_id).validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,

    #[error("{}", INVALID_PAYLOAD_MESSAGE)]
    InvalidPayload,
}

/// Body of `POST /api/clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl ClearRequest {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
        }
    }
}

/// Success body for generate and refine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_id: String,
    /// `data:<mime>;base64,<bytes>`
    pub image_data: String,
    /// Opaque provenance token, display only.
    pub seed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub ok: bool,
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub message: String,
}
