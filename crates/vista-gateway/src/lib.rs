pub mod config;
pub mod dryrun;
pub mod error;
pub mod gemini;
pub mod traits;

pub use config::{ClientFactory, GeminiConfig, ProviderConfig, ProviderDetails, ProviderType};
pub use dryrun::DryRunClient;
pub use error::GatewayError;
pub use gemini::GeminiClient;
pub use traits::{BaseImage, GeneratedImage, ImageClient, ImageRequest};
