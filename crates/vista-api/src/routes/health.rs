use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use vista_types::HelloResponse;

use crate::{error::ApiResult, state::AppState};

pub const READY_MESSAGE: &str = "Mockup server ready";
pub const ROOT_BANNER: &str = "AI Visual Generator server";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub threads: usize,
}

/// Health check endpoint
///
/// Reports the configured image provider and how many threads are held.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let threads = state
        .pipeline
        .store()
        .thread_count()
        .await
        .map_err(vista_pipeline::PipelineError::from)?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.pipeline.image_client().name().to_string(),
        threads,
    }))
}

#[utoipa::path(
    get,
    path = "/api/hello",
    responses(
        (status = 200, description = "Server is up", body = HelloResponse)
    ),
    tag = "health"
)]
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: READY_MESSAGE.to_string(),
    })
}

pub async fn root() -> &'static str {
    ROOT_BANNER
}
