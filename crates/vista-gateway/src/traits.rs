use crate::error::GatewayError;
use async_trait::async_trait;

/// Produces a new image from a prompt, optionally editing a base image.
///
/// Implementations make exactly one outbound call per invocation and keep
/// no state between calls. Retrying is left to the caller.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Provider name, used for logging and health output
    fn name(&self) -> &str;

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub base: Option<BaseImage>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            base: None,
        }
    }

    pub fn with_base(mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.base = Some(BaseImage {
            bytes,
            mime_type: mime_type.into(),
        });
        self
    }

    pub fn is_refinement(&self) -> bool {
        self.base.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Opaque provenance token; never interpreted.
    pub seed: String,
}

/// Short opaque token used when a provider reports no provenance id.
pub fn synthesize_seed() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(12);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_builder() {
        let plain = ImageRequest::new("a red cube");
        assert!(!plain.is_refinement());

        let refine = ImageRequest::new("make it blue").with_base(vec![1, 2, 3], "image/png");
        assert!(refine.is_refinement());
        assert_eq!(refine.base.unwrap().bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_synthesized_seed_shape() {
        let seed = synthesize_seed();
        assert_eq!(seed.len(), 12);
        assert!(seed.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(seed, synthesize_seed());
    }
}
