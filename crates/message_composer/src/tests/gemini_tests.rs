use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockGemini {
    reply: (StatusCode, Value),
    seen: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn generate_content(
    State(mock): State<MockGemini>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.seen.lock().await.push((model_call, key, body));
    (mock.reply.0, Json(mock.reply.1.clone()))
}

async fn spawn_gemini(status: StatusCode, reply: Value) -> (String, MockGemini) {
    let mock = MockGemini {
        reply: (status, reply),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:model_call", post(generate_content))
        .with_state(mock.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), mock)
}

#[tokio::test]
async fn sends_prompt_and_joins_candidate_parts() {
    let (url, mock) = spawn_gemini(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"parts": [{"text": "أهلاً "}, {"text": "وسهلاً"}], "role": "model"}
            }]
        }),
    )
    .await;
    let client = GeminiClient::new(&url, "test-key", DEFAULT_TIMEOUT).expect("client");

    let text = client
        .generate("gemini-2.5-flash", "say hi")
        .await
        .expect("generate");
    assert_eq!(text.as_deref(), Some("أهلاً وسهلاً"));

    let seen = mock.seen.lock().await.clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "gemini-2.5-flash:generateContent");
    assert_eq!(seen[0].1.as_deref(), Some("test-key"));
    assert_eq!(seen[0].2, json!({"contents": [{"parts": [{"text": "say hi"}]}]}));
}

#[tokio::test]
async fn missing_candidates_yield_no_text() {
    let (url, _mock) = spawn_gemini(StatusCode::OK, json!({"promptFeedback": {}})).await;
    let client = GeminiClient::new(&url, "k", DEFAULT_TIMEOUT).expect("client");
    assert_eq!(client.generate("m", "p").await.expect("generate"), None);
}

#[tokio::test]
async fn http_errors_are_reported() {
    let (url, _mock) = spawn_gemini(
        StatusCode::FORBIDDEN,
        json!({"error": {"message": "API key not valid"}}),
    )
    .await;
    let client = GeminiClient::new(&url, "bad", DEFAULT_TIMEOUT).expect("client");
    match client.generate("m", "p").await {
        Err(GenerationError::Status { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("unexpected result: {:?}", other.map_err(|e| e.to_string())),
    }
}

#[tokio::test]
async fn unreachable_backend_composes_default_busy_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client =
        GeminiClient::new(&format!("http://{addr}"), "k", DEFAULT_TIMEOUT).expect("client");
    let composer = crate::MessageComposer::new(Arc::new(client), DEFAULT_MODEL);
    assert_eq!(
        composer.compose(shared::OfficeStatus::Busy, "اجتماع").await,
        shared::OfficeStatus::Busy.default_message()
    );
}
