use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use vista_pipeline::PipelineError;
use vista_types::{ErrorBody, ValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::Pipeline(PipelineError::Gateway(e)) => {
                tracing::error!(kind = e.kind(), "Image model error: {}", e);
                e.to_string()
            }
            ApiError::Pipeline(PipelineError::Store(e)) => {
                tracing::error!("Storage error: {}", e);
                "Storage error".to_string()
            }
            ApiError::Pipeline(e) => e.to_string(),
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
