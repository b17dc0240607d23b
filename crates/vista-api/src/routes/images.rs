use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use vista_types::{ErrorBody, ImageResponse, PromptRequest, ValidatedPrompt, ValidationError};

use crate::{error::ApiResult, state::AppState};

/// Non-JSON or wrongly typed bodies are rejected with the payload message,
/// never with axum's default rejection text.
fn validated(payload: Result<Json<PromptRequest>, JsonRejection>) -> ApiResult<ValidatedPrompt> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ValidationError::InvalidPayload
    })?;
    Ok(request.validate()?)
}

/// Start (or restart) a thread from a text prompt
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Image generated", body = ImageResponse),
        (status = 400, description = "Missing prompt or thread id", body = ErrorBody),
        (status = 500, description = "Image model failure", body = ErrorBody)
    ),
    tag = "images"
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult<Json<ImageResponse>> {
    let input = validated(payload)?;
    let outcome = state.pipeline.generate(&input).await?;
    Ok(Json(outcome.to_response()))
}

/// Edit the thread's latest image with a new instruction
#[utoipa::path(
    post,
    path = "/api/refine",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Image refined", body = ImageResponse),
        (status = 400, description = "Invalid request or thread not started", body = ErrorBody),
        (status = 500, description = "Image model failure", body = ErrorBody)
    ),
    tag = "images"
)]
pub async fn refine(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult<Json<ImageResponse>> {
    let input = validated(payload)?;
    let outcome = state.pipeline.refine(&input).await?;
    Ok(Json(outcome.to_response()))
}
