use axum::Json;
use utoipa::OpenApi;

use vista_types::{ClearRequest, ClearResponse, ErrorBody, HelloResponse, ImageResponse, PromptRequest};

use crate::routes::{health, images, threads};

#[derive(OpenApi)]
#[openapi(
    paths(
        images::generate,
        images::refine,
        threads::clear_thread,
        health::health_check,
        health::hello,
    ),
    components(schemas(
        PromptRequest,
        ClearRequest,
        ImageResponse,
        ClearResponse,
        ErrorBody,
        HelloResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "images", description = "Generate and refine images within a thread"),
        (name = "threads", description = "Thread lifecycle"),
        (name = "health", description = "Liveness")
    ),
    info(title = "Vista API")
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
