pub mod contract;
pub mod data_uri;

pub use contract::{
    ClearRequest, ClearResponse, ErrorBody, HelloResponse, ImageResponse, PromptRequest,
    ValidatedPrompt, ValidationError,
};
pub use data_uri::{DataUri, DataUriError};
