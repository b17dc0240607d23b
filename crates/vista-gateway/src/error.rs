use thiserror::Error;

pub const MISSING_KEY_MESSAGE: &str =
    "NANO_API_KEY is missing. Add it to your environment before generating.";
pub const NO_IMAGE_MESSAGE: &str = "Image model did not return image data.";

/// Failure of a single gateway call. Every variant is terminal for that call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Deployment defect, e.g. no credential configured.
    #[error("{0}")]
    Unconfigured(String),

    /// Network, timeout or provider-side failure.
    #[error("{0}")]
    Upstream(String),

    /// The provider answered but produced no usable image. Carries the
    /// provider's explanatory text when it sent one.
    #[error("{0}")]
    NoImageReturned(String),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unconfigured(_) => "unconfigured",
            GatewayError::Upstream(_) => "upstream_failure",
            GatewayError::NoImageReturned(_) => "no_image_returned",
        }
    }

    pub fn no_image(explanation: Option<&str>) -> Self {
        let message = explanation
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_IMAGE_MESSAGE);
        GatewayError::NoImageReturned(message.to_string())
    }
}
