use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use vista_types::{ClearRequest, ClearResponse};

use crate::state::AppState;

/// Discard a thread's state
///
/// Always answers `{ "ok": true }`, including for unknown threads and
/// bodies that do not parse.
#[utoipa::path(
    post,
    path = "/api/clear",
    request_body = ClearRequest,
    responses(
        (status = 200, description = "Thread cleared", body = ClearResponse)
    ),
    tag = "threads"
)]
pub async fn clear_thread(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Json<ClearResponse> {
    let thread_id = payload.ok().and_then(|Json(req)| req.thread_id);

    if let Some(thread_id) = thread_id.filter(|id| !id.is_empty()) {
        if let Err(e) = state.pipeline.clear(&thread_id).await {
            tracing::warn!(thread_id = %thread_id, "Clear failed: {}", e);
        }
    }

    Json(ClearResponse::default())
}
