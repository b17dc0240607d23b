// Gemini generateContent client (HTTP direct, no SDK)

use crate::error::{GatewayError, MISSING_KEY_MESSAGE};
use crate::gemini::types::GenerateContentResponse;
use crate::traits::{synthesize_seed, GeneratedImage, ImageClient, ImageRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MIME: &str = "image/png";
const ERROR_BODY_LIMIT: usize = 500;

/// Image generation client for Gemini image models.
///
/// The API key is checked per call rather than at construction, so a server
/// can start without credentials and report `Unconfigured` on each request.
#[derive(Debug)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Single-turn request: text only, or text plus the inline base image.
    fn build_payload(&self, request: &ImageRequest) -> Value {
        let mut parts = vec![serde_json::json!({ "text": request.prompt })];

        if let Some(base) = &request.base {
            parts.push(serde_json::json!({
                "inlineData": {
                    "mimeType": base.mime_type,
                    "data": BASE64.encode(&base.bytes),
                }
            }));
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }]
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Upstream(format!(
                "Image model request timed out after {:?}",
                self.timeout
            ))
        } else {
            GatewayError::Upstream(format!("Image model request failed: {}", err))
        }
    }
}

fn normalize(raw: GenerateContentResponse) -> Result<GeneratedImage, GatewayError> {
    let Some(inline) = raw.image_data() else {
        return Err(GatewayError::no_image(raw.explanation()));
    };

    let data = inline.data.as_deref().unwrap_or_default();
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| GatewayError::NoImageReturned(format!("Image payload was not valid base64: {}", e)))?;
    let mime_type = inline
        .mime_type
        .clone()
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| DEFAULT_MIME.to_string());
    let seed = raw
        .response_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(synthesize_seed);

    Ok(GeneratedImage {
        bytes,
        mime_type,
        seed,
    })
}

#[async_trait]
impl ImageClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Unconfigured(MISSING_KEY_MESSAGE.to_string()))?;

        let payload = self.build_payload(&request);

        tracing::debug!(
            model = %self.model,
            refine = request.is_refinement(),
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let mut error_text = response.text().await.unwrap_or_default();
            if error_text.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !error_text.is_char_boundary(cut) {
                    cut -= 1;
                }
                error_text.truncate(cut);
            }
            return Err(GatewayError::Upstream(format!(
                "Image model API error ({}): {}",
                status, error_text
            )));
        }

        let raw: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Failed to parse image model response: {}", e)))?;

        normalize(raw)
    }
}

/// Builder for GeminiClient
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiClientBuilder {
    /// Empty keys are treated as missing.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Example: "https://generativelanguage.googleapis.com/v1beta"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        if self.model.trim().is_empty() {
            anyhow::bail!("Model is required");
        }

        let base_url = self.base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(GeminiClient {
            http_client,
            api_key: self.api_key,
            model: self.model,
            base_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> GeminiClient {
        GeminiClient::builder()
            .api_key(Some("test-key".to_string()))
            .base_url("https://example.test/v1beta/")
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            client().endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn test_text_only_payload() {
        let payload = client().build_payload(&ImageRequest::new("a red cube"));
        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "a red cube");
        assert_eq!(payload["contents"][0]["role"], "user");
    }

    #[test]
    fn test_refine_payload_carries_inline_base() {
        let request = ImageRequest::new("make it blue").with_base(b"hi".to_vec(), "image/jpeg");
        let payload = client().build_payload(&request);
        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "aGk=");
    }

    #[test]
    fn test_normalize_defaults_mime_and_synthesizes_seed() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "aGk=" } }] } }]
        }))
        .unwrap();
        let image = normalize(raw).unwrap();
        assert_eq!(image.bytes, b"hi");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.seed.len(), 12);
    }

    #[test]
    fn test_normalize_bad_base64() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "parts": [{ "inlineData": { "data": "***" } }]
        }))
        .unwrap();
        assert!(matches!(normalize(raw), Err(GatewayError::NoImageReturned(_))));
    }

    #[tokio::test]
    async fn test_missing_key_is_unconfigured() {
        let client = GeminiClient::builder().api_key(Some("  ".to_string())).build().unwrap();
        let err = client.generate_image(ImageRequest::new("x")).await.unwrap_err();
        assert_eq!(err, GatewayError::Unconfigured(MISSING_KEY_MESSAGE.to_string()));
    }
}
