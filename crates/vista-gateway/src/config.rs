// Provider configuration and client factory

use crate::dryrun::DryRunClient;
use crate::gemini::{GeminiClient, DEFAULT_MODEL};
use crate::traits::ImageClient;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Type of image provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Gemini,
    #[serde(rename = "dryrun")]
    DryRun,
}

/// Configuration for the Gemini provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Secret; never serialized back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Provider-specific configuration details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderDetails {
    Gemini(GeminiConfig),
    #[serde(rename = "dryrun")]
    DryRun,
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(flatten)]
    pub details: ProviderDetails,
}

impl ProviderConfig {
    pub fn gemini(config: GeminiConfig) -> Self {
        Self {
            details: ProviderDetails::Gemini(config),
        }
    }

    pub fn dry_run() -> Self {
        Self {
            details: ProviderDetails::DryRun,
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        match self.details {
            ProviderDetails::Gemini(_) => ProviderType::Gemini,
            ProviderDetails::DryRun => ProviderType::DryRun,
        }
    }
}

/// Factory for creating image clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: ProviderConfig) -> Result<Arc<dyn ImageClient>> {
        match config.details {
            ProviderDetails::Gemini(gemini) => {
                let mut builder = GeminiClient::builder()
                    .api_key(gemini.api_key)
                    .model(gemini.model)
                    .timeout(Duration::from_secs(gemini.timeout_secs.max(1)));
                if let Some(base_url) = gemini.base_url {
                    builder = builder.base_url(base_url);
                }
                Ok(Arc::new(builder.build()?))
            }
            ProviderDetails::DryRun => Ok(Arc::new(DryRunClient::new())),
        }
    }
}
