use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use vista_gateway::{GeminiConfig, ProviderConfig, ProviderType};
use vista_persist::{MemoryThreadStore, ThreadStoreBuilder};

pub const API_KEY_ENV: &str = "NANO_API_KEY";
pub const MODEL_ENV: &str = "NANO_MODEL_ID";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub nano_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::default(),
            model: default_model(),
            base_url: None,
            timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    vista_gateway::gemini::DEFAULT_MODEL.to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    120
}

/// Thread store limits. Zero disables the corresponding limit.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub ttl_secs: u64,
    #[serde(default)]
    pub max_threads: usize,
    #[serde(default = "default_true")]
    pub serialize_threads: bool,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0,
            max_threads: 0,
            serialize_threads: true,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl StoreConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// Sweeping only makes sense when threads can expire.
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.ttl() {
            Some(_) if self.sweep_interval_secs > 0 => {
                Some(Duration::from_secs(self.sweep_interval_secs))
            }
            _ => None,
        }
    }

    pub fn build_store(&self) -> MemoryThreadStore {
        let builder = ThreadStoreBuilder::new().max_threads(self.max_threads);
        match self.ttl() {
            Some(ttl) => builder.ttl(ttl).build(),
            None => builder.build(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables named `VISTA_<SECTION>__<KEY>`,
    ///    e.g. `VISTA_SERVER__PORT=8080`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("VISTA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_secrets();
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    /// The key is optional at startup; requests fail with a clear message
    /// until it is provided.
    fn apply_secrets(&mut self) {
        self.nano_api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.gateway.model = model;
            }
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        match self.gateway.provider {
            ProviderType::Gemini => {
                let mut gemini = GeminiConfig::new(self.nano_api_key.clone())
                    .with_model(self.gateway.model.clone())
                    .with_timeout_secs(self.gateway.timeout_secs);
                if let Some(base_url) = &self.gateway.base_url {
                    gemini = gemini.with_base_url(base_url.clone());
                }
                ProviderConfig::gemini(gemini)
            }
            ProviderType::DryRun => ProviderConfig::dry_run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [cors]
            enabled = true
            origins = ["http://localhost:3000"]

            [gateway]
            provider = "dryrun"
            model = "gemini-2.5-flash-image"
            timeout_secs = 30

            [store]
            ttl_secs = 3600
            max_threads = 500

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.body_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.gateway.provider, ProviderType::DryRun);
        assert_eq!(config.store.ttl(), Some(Duration::from_secs(3600)));
        assert_eq!(config.store.sweep_interval(), Some(Duration::from_secs(60)));
        assert!(config.store.serialize_threads);
        assert_eq!(config.provider_config().provider_type(), ProviderType::DryRun);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.gateway.model, "gemini-2.5-flash-image");
        assert_eq!(config.gateway.provider, ProviderType::Gemini);
        assert!(config.store.ttl().is_none());
        assert!(config.store.sweep_interval().is_none());
        assert!(config.nano_api_key.is_none());
    }

    #[test]
    fn test_gemini_provider_config_carries_key() {
        let mut config = Config::default();
        config.nano_api_key = Some("secret".to_string());
        config.gateway.base_url = Some("http://localhost:9999".to_string());

        match config.provider_config().details {
            vista_gateway::ProviderDetails::Gemini(gemini) => {
                assert_eq!(gemini.api_key.as_deref(), Some("secret"));
                assert_eq!(gemini.base_url.as_deref(), Some("http://localhost:9999"));
            }
            other => panic!("unexpected provider: {:?}", other),
        }
    }
}
