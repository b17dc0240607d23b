mod client;
mod types;

pub use client::{GeminiClient, GeminiClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use types::{GenerateContentResponse, InlineData, Part};
