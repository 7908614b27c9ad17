// Chat streaming tests with scripted model backends.
//
// Covers the wire contract of /api/kt/chat when a model is configured:
// delta pass-through, file-reference collection, terminal errors,
// pre-stream failures, prompt assembly, and exchange persistence.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, Receiver};
use tower::ServiceExt;

use codekt::openai::{ChatMessage, ChatModel};
use codekt::server::{create_router, AppState};
use codekt::store::{seed, MemStore};

/// Replays a fixed script of deltas through the model seam.
struct ScriptedModel {
    script: Vec<Result<String, String>>,
}

impl ScriptedModel {
    fn new(deltas: &[&str]) -> Self {
        Self {
            script: deltas.iter().map(|d| Ok(d.to_string())).collect(),
        }
    }

    fn failing_after(deltas: &[&str], error: &str) -> Self {
        let mut script: Vec<Result<String, String>> =
            deltas.iter().map(|d| Ok(d.to_string())).collect();
        script.push(Err(error.to_string()));
        Self { script }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(&self, _messages: Vec<ChatMessage>) -> Result<Receiver<Result<String>>> {
        let (tx, rx) = mpsc::channel(16);
        let script = self.script.clone();
        tokio::spawn(async move {
            for entry in script {
                let sent = match entry {
                    Ok(delta) => tx.send(Ok(delta)).await,
                    Err(message) => tx.send(Err(anyhow::anyhow!(message))).await,
                };
                if sent.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

/// Rejects every completion before any delta is produced.
struct RefusingModel;

#[async_trait]
impl ChatModel for RefusingModel {
    fn name(&self) -> &str {
        "refusing"
    }

    async fn stream_chat(&self, _messages: Vec<ChatMessage>) -> Result<Receiver<Result<String>>> {
        anyhow::bail!("upstream rejected the request")
    }
}

/// Records the request messages and answers with an empty stream.
struct CapturingModel {
    seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

#[async_trait]
impl ChatModel for CapturingModel {
    fn name(&self) -> &str {
        "capturing"
    }

    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<Receiver<Result<String>>> {
        self.seen.lock().unwrap().push(messages);
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }
}

async fn state_with_model(model: impl ChatModel + 'static) -> AppState {
    let store = MemStore::new();
    seed::load_demo_project(&store).await;
    AppState {
        store,
        model: Some(Arc::new(model)),
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Drain an SSE response body into its `data:` payloads.
async fn collect_events(response: axum::response::Response) -> Vec<Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    std::str::from_utf8(&bytes)
        .unwrap()
        .split("\n\n")
        .filter_map(|chunk| chunk.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

/// Deltas come back as `content` events in arrival order, closed by `done`.
#[tokio::test]
async fn test_model_deltas_stream_in_order() {
    let app = create_router(state_with_model(ScriptedModel::new(&["Hello", " world"])).await);

    let response = app
        .oneshot(post_json("/api/kt/chat", json!({ "message": "hi" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let events = collect_events(response).await;
    assert_eq!(
        events,
        vec![
            json!({ "content": "Hello" }),
            json!({ "content": " world" }),
            json!({ "done": true }),
        ]
    );
}

/// Markdown link targets across the whole response surface once, in first
/// appearance order, right before `done`.
#[tokio::test]
async fn test_file_references_collected_and_deduped() {
    let model = ScriptedModel::new(&[
        "See [App](src/App.tsx)",
        " and [Header](src/components/layout/Header.tsx).",
        " Back to [App](src/App.tsx).",
    ]);
    let app = create_router(state_with_model(model).await);

    let response = app
        .oneshot(post_json("/api/kt/chat", json!({ "message": "entry point?" })))
        .await
        .unwrap();
    let events = collect_events(response).await;

    assert_eq!(events.len(), 5);
    assert_eq!(
        events[3],
        json!({ "fileReferences": ["src/App.tsx", "src/components/layout/Header.tsx"] })
    );
    assert_eq!(events[4], json!({ "done": true }));
}

/// A link split across two deltas never matches; the collector sees each
/// chunk in isolation while the client reassembles the full text.
#[tokio::test]
async fn test_link_split_across_chunks_is_not_collected() {
    let model = ScriptedModel::new(&["see [Hea", "der](src/Header.tsx) for details"]);
    let app = create_router(state_with_model(model).await);

    let response = app
        .oneshot(post_json("/api/kt/chat", json!({ "message": "where?" })))
        .await
        .unwrap();
    let events = collect_events(response).await;

    assert!(events.iter().all(|e| e.get("fileReferences").is_none()));
    let text: String = events
        .iter()
        .filter_map(|e| e.get("content").and_then(Value::as_str))
        .collect();
    assert_eq!(text, "see [Header](src/Header.tsx) for details");
}

/// A failure mid-stream ends the stream with one `error` event. No `done`
/// follows and the partial exchange is not persisted.
#[tokio::test]
async fn test_mid_stream_error_ends_stream_without_done() {
    let model = ScriptedModel::failing_after(&["partial answer"], "connection reset");
    let state = state_with_model(model).await;
    let app = create_router(state.clone());

    let conversation = body_json(
        app.clone()
            .oneshot(post_json("/api/kt/conversations", json!({ "title": "KT" })))
            .await
            .unwrap(),
    )
    .await;
    let conversation_id = conversation["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/kt/chat",
            json!({ "conversationId": conversation_id, "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = collect_events(response).await;
    assert_eq!(
        events,
        vec![
            json!({ "content": "partial answer" }),
            json!({ "error": "Failed to process message" }),
        ]
    );

    let uri = format!("/api/kt/conversations/{conversation_id}/messages");
    let messages = body_json(
        app.oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(messages, json!([]));
}

/// When the completion request itself is refused there is no stream to
/// break: the endpoint answers a plain 500.
#[tokio::test]
async fn test_pre_stream_failure_returns_plain_500() {
    let app = create_router(state_with_model(RefusingModel).await);

    let response = app
        .oneshot(post_json("/api/kt/chat", json!({ "message": "hi" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to process message" })
    );
}

/// A completed exchange lands as user turn then assistant turn, with the
/// collected link targets stored on the assistant message.
#[tokio::test]
async fn test_completed_exchange_persists_user_then_assistant() {
    let model = ScriptedModel::new(&["Start at [App](src/App.tsx)", ", the root component."]);
    let state = state_with_model(model).await;
    let app = create_router(state.clone());

    let conversation = body_json(
        app.clone()
            .oneshot(post_json("/api/kt/conversations", json!({})))
            .await
            .unwrap(),
    )
    .await;
    let conversation_id = conversation["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/kt/chat",
            json!({ "conversationId": conversation_id, "message": "what is the entry point?" }),
        ))
        .await
        .unwrap();
    // Drain the stream; persistence happens before the final done event.
    let events = collect_events(response).await;
    assert_eq!(events.last(), Some(&json!({ "done": true })));

    let uri = format!("/api/kt/conversations/{conversation_id}/messages");
    let messages = body_json(
        app.oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "what is the entry point?");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(
        messages[1]["content"],
        "Start at [App](src/App.tsx), the root component."
    );
    assert_eq!(messages[1]["fileReferences"], json!(["src/App.tsx"]));
}

#[tokio::test]
async fn test_no_persistence_without_conversation_id() {
    let model = ScriptedModel::new(&["an answer"]);
    let state = state_with_model(model).await;
    let app = create_router(state.clone());

    let conversation = body_json(
        app.clone()
            .oneshot(post_json("/api/kt/conversations", json!({})))
            .await
            .unwrap(),
    )
    .await;
    let conversation_id = conversation["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/kt/chat", json!({ "message": "hi" })))
        .await
        .unwrap();
    let events = collect_events(response).await;
    assert_eq!(events.last(), Some(&json!({ "done": true })));

    let uri = format!("/api/kt/conversations/{conversation_id}/messages");
    let messages = body_json(
        app.oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(messages, json!([]));
}

/// The system turn carries the persona preamble with the live project
/// context embedded; the user turn is the raw question.
#[tokio::test]
async fn test_system_prompt_carries_project_context() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let model = CapturingModel { seen: seen.clone() };
    let app = create_router(state_with_model(model).await);

    let response = app
        .oneshot(post_json(
            "/api/kt/chat",
            json!({ "message": "what does AppSidebar do?" }),
        ))
        .await
        .unwrap();
    let _ = collect_events(response).await;

    let captured = seen.lock().unwrap();
    let messages = &captured[0];
    assert_eq!(messages.len(), 2);

    let system = serde_json::to_value(&messages[0]).unwrap();
    assert_eq!(system["role"], "system");
    let text = system["content"].as_str().unwrap();
    assert!(text.contains("Code KT (Knowledge Transfer) Assistant"));
    assert!(text.contains("PROJECT: Demo Frontend App"));
    assert!(text.contains("YOUR CAPABILITIES:"));

    let user = serde_json::to_value(&messages[1]).unwrap();
    assert_eq!(user["role"], "user");
    assert_eq!(user["content"], "what does AppSidebar do?");
}

/// A data-URL screenshot turns the user message into content parts, with
/// the default question standing in when no text was sent.
#[tokio::test]
async fn test_image_turn_uses_content_parts_with_default_question() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let model = CapturingModel { seen: seen.clone() };
    let app = create_router(state_with_model(model).await);

    let response = app
        .oneshot(post_json(
            "/api/kt/chat",
            json!({ "imageUrl": "data:image/png;base64,iVBORw0KGgo=" }),
        ))
        .await
        .unwrap();
    let _ = collect_events(response).await;

    let captured = seen.lock().unwrap();
    let user = serde_json::to_value(&captured[0][1]).unwrap();
    assert_eq!(user["role"], "user");
    let parts = user["content"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["type"], "text");
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .starts_with("What can you tell me about this UI screenshot?"));
    assert_eq!(parts[1]["type"], "image_url");
    assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,iVBORw0KGgo=");
}

/// Only data URLs get the vision treatment; an ordinary link rides along
/// as a plain text turn.
#[tokio::test]
async fn test_plain_url_is_not_treated_as_screenshot() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let model = CapturingModel { seen: seen.clone() };
    let app = create_router(state_with_model(model).await);

    let response = app
        .oneshot(post_json(
            "/api/kt/chat",
            json!({ "message": "look at this", "imageUrl": "https://example.com/shot.png" }),
        ))
        .await
        .unwrap();
    let _ = collect_events(response).await;

    let captured = seen.lock().unwrap();
    let user = serde_json::to_value(&captured[0][1]).unwrap();
    assert_eq!(user["content"], "look at this");
}
