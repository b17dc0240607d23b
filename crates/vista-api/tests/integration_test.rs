use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tower::ServiceExt;

use vista_api::{build_router, config::Config, state::AppState};
use vista_gateway::{DryRunClient, GatewayError, GeneratedImage, ImageClient, ImageRequest};
use vista_pipeline::Pipeline;
use vista_types::DataUri;

#[derive(Default)]
struct ScriptedClient {
    results: Mutex<VecDeque<Result<GeneratedImage, GatewayError>>>,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedClient {
    fn push_image(&self, bytes: &[u8], mime_type: &str, seed: &str) {
        self.results.lock().push_back(Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            mime_type: mime_type.to_string(),
            seed: seed.to_string(),
        }));
    }

    fn push_error(&self, error: GatewayError) {
        self.results.lock().push_back(Err(error));
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_request(&self) -> Option<ImageRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ImageClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError> {
        self.requests.lock().push(request);
        self.results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Upstream("script exhausted".to_string())))
    }
}

fn app_with(client: Arc<dyn ImageClient>) -> Router {
    let pipeline = Pipeline::builder().image_client(client).build().unwrap();
    build_router(Arc::new(AppState::new(Config::default(), pipeline)))
}

fn scripted_app() -> (Arc<ScriptedClient>, Router) {
    let client = Arc::new(ScriptedClient::default());
    let app = app_with(client.clone());
    (client, app)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_generate_returns_image_response() {
    let (client, app) = scripted_app();
    client.push_image(&[1, 2, 3], "image/png", "resp-1");

    let (status, body) = send(
        &app,
        post_json("/api/generate", json!({"prompt": "a red fox", "threadId": "t1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seed"], "resp-1");
    assert!(!body["imageId"].as_str().unwrap().is_empty());

    let uri = DataUri::parse(body["imageData"].as_str().unwrap()).unwrap();
    assert_eq!(uri.mime_type, "image/png");
    assert_eq!(uri.bytes, vec![1, 2, 3]);

    let request = client.last_request().unwrap();
    assert_eq!(request.prompt, "a red fox");
    assert!(!request.is_refinement());
}

#[tokio::test]
async fn test_generate_missing_fields() {
    let (client, app) = scripted_app();

    for body in [
        json!({"threadId": "t1"}),
        json!({"prompt": "a fox"}),
        json!({"prompt": "", "threadId": "t1"}),
        json!({}),
    ] {
        let (status, body) = send(&app, post_json("/api/generate", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt and threadId are required.");
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_invalid_payload() {
    let (client, app) = scripted_app();

    let (status, body) = send(
        &app,
        post_json("/api/generate", json!({"prompt": 5, "threadId": "t1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid payload.");

    let (status, body) = send(&app, post_raw("/api/refine", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid payload.");

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_refine_before_generate() {
    let (client, app) = scripted_app();

    let (status, body) = send(
        &app,
        post_json("/api/refine", json!({"prompt": "make it blue", "threadId": "fresh"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Start a thread with Generate before refining.");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_generate_then_refine_uses_previous_image() {
    let (client, app) = scripted_app();
    client.push_image(&[9, 9], "image/jpeg", "s1");
    client.push_image(&[7], "image/png", "s2");

    let (status, first) = send(
        &app,
        post_json("/api/generate", json!({"prompt": "a fox", "threadId": "t1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = send(
        &app,
        post_json(
            "/api/refine",
            json!({
                "prompt": "make it blue",
                "threadId": "t1",
                "lastImageId": first["imageId"],
                "lastSeed": first["seed"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["seed"], "s2");
    assert_ne!(second["imageId"], first["imageId"]);

    let request = client.last_request().unwrap();
    let base = request.base.expect("refine sends the previous image");
    assert_eq!(base.bytes, vec![9, 9]);
    assert_eq!(base.mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_gateway_failure_surfaces_message() {
    let (client, app) = scripted_app();
    client.push_error(GatewayError::Unconfigured(
        "NANO_API_KEY is missing. Add it to your environment before generating.".to_string(),
    ));

    let (status, body) = send(
        &app,
        post_json("/api/generate", json!({"prompt": "a fox", "threadId": "t1"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "NANO_API_KEY is missing. Add it to your environment before generating."
    );
}

#[tokio::test]
async fn test_clear_always_ok() {
    let (client, app) = scripted_app();
    client.push_image(&[1], "image/png", "s1");

    send(
        &app,
        post_json("/api/generate", json!({"prompt": "a fox", "threadId": "t1"})),
    )
    .await;

    for body in [
        post_json("/api/clear", json!({"threadId": "t1"})),
        post_json("/api/clear", json!({"threadId": "never-seen"})),
        post_json("/api/clear", json!({})),
        post_raw("/api/clear", "garbage"),
    ] {
        let (status, body) = send(&app, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    let (status, body) = send(
        &app,
        post_json("/api/refine", json!({"prompt": "again", "threadId": "t1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Start a thread with Generate before refining.");
}

#[tokio::test]
async fn test_auxiliary_routes() {
    let app = app_with(Arc::new(DryRunClient::new()));

    let (status, text) = get_text(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "AI Visual Generator server");

    let (status, text) = get_text(&app, "/api/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"message": "Mockup server ready"})
    );

    let (status, text) = get_text(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["provider"], "dryrun");
    assert_eq!(health["threads"], 0);

    let (status, text) = get_text(&app, "/api/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert!(doc["paths"]["/api/generate"].is_object());
    assert!(doc["paths"]["/api/clear"].is_object());
}

#[tokio::test]
async fn test_dry_run_thread_end_to_end() {
    let app = app_with(Arc::new(DryRunClient::new()));

    let (status, first) = send(
        &app,
        post_json("/api/generate", json!({"prompt": "sunset", "threadId": "demo"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["imageData"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let (status, second) = send(
        &app,
        post_json("/api/refine", json!({"prompt": "add clouds", "threadId": "demo"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["imageId"], first["imageId"]);

    let (_, text) = get_text(&app, "/health").await;
    let health: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(health["threads"], 1);
}
