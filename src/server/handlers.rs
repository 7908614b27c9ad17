// Request handlers and router assembly.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::chat::{
    build_project_context, compose_system_prompt, fallback, run_fallback_relay, run_model_relay,
    ChatEvent, Exchange,
};
use crate::openai::ChatMessage;
use crate::schema::{
    ArchitectureNode, CodeFlow, Component, Conversation, Dependency, FileTreeNode, Message,
    NewConversation, NewProject, NewProjectMetrics, Project, ProjectMetrics, Route as RouteRecord,
    ScanStatus, Service,
};

use super::{ApiError, AppState};

/// Stub scanner: how long a "scan" stays in the scanning state.
const SCAN_DURATION: Duration = Duration::from_secs(3);

/// Default question for an image-only chat turn.
const SCREENSHOT_QUESTION: &str = "What can you tell me about this UI screenshot? Identify components and suggest relevant files for modifications.";

/// Build the API router around shared state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/projects/current", get(handle_current_project))
        .route("/api/projects/current/metrics", get(handle_metrics))
        .route("/api/projects/current/dependencies", get(handle_dependencies))
        .route("/api/projects/current/components", get(handle_components))
        .route("/api/projects/current/services", get(handle_services))
        .route("/api/projects/current/routes", get(handle_routes))
        .route("/api/projects/current/architecture", get(handle_architecture))
        .route("/api/projects/current/flows", get(handle_flows))
        .route("/api/projects/current/files", get(handle_file_tree))
        .route("/api/files/content", get(handle_file_content_query))
        .route("/api/files/content/*path", get(handle_file_content))
        .route("/api/projects/scan", post(handle_scan))
        .route("/api/projects/configure", post(handle_configure))
        .route(
            "/api/kt/conversations",
            get(handle_list_conversations).post(handle_create_conversation),
        )
        .route("/api/kt/conversations/:id", delete(handle_delete_conversation))
        .route("/api/kt/conversations/:id/messages", get(handle_messages))
        .route("/api/kt/chat", post(handle_chat))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// Project metadata reads. The list endpoints answer `[]` when no project
// has been configured yet; only the project and metrics endpoints 404.

async fn handle_current_project(
    State(state): State<AppState>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .store
        .current_project()
        .await
        .ok_or_else(|| ApiError::not_found("No project found"))?;
    Ok(Json(project))
}

async fn handle_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let project = state
        .store
        .current_project()
        .await
        .ok_or_else(|| ApiError::not_found("No project found"))?;
    let response = match state.store.project_metrics(project.id).await {
        Some(metrics) => Json::<ProjectMetrics>(metrics).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    };
    Ok(response)
}

async fn handle_dependencies(State(state): State<AppState>) -> Json<Vec<Dependency>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.dependencies(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_components(State(state): State<AppState>) -> Json<Vec<Component>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.components(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.services(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_routes(State(state): State<AppState>) -> Json<Vec<RouteRecord>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.routes(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_architecture(State(state): State<AppState>) -> Json<Vec<ArchitectureNode>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.architecture_nodes(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_flows(State(state): State<AppState>) -> Json<Vec<CodeFlow>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.code_flows(project.id).await),
        None => Json(vec![]),
    }
}

async fn handle_file_tree(State(state): State<AppState>) -> Json<Vec<FileTreeNode>> {
    match state.store.current_project().await {
        Some(project) => Json(state.store.file_tree(project.id).await),
        None => Json(vec![]),
    }
}

// File content: path arrives either as the trailing path segments or as a
// `?path=` query parameter.

#[derive(Debug, Deserialize)]
struct FileContentQuery {
    path: Option<String>,
}

async fn handle_file_content(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Json<String> {
    Json(state.store.file_content(&path).await)
}

async fn handle_file_content_query(
    State(state): State<AppState>,
    Query(query): Query<FileContentQuery>,
) -> Result<Json<String>, ApiError> {
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Path is required"))?;
    Ok(Json(state.store.file_content(&path).await))
}

/// Kick off the stub scan: flip the current project to `scanning`, stamp
/// `lastScanned`, and let a timer flip it to `completed`. With no project
/// configured there is nothing to scan but the response is the same.
async fn handle_scan(State(state): State<AppState>) -> Json<serde_json::Value> {
    if let Some(project) = state.store.current_project().await {
        state
            .store
            .update_project(project.id, |p| {
                p.status = ScanStatus::Scanning;
                p.last_scanned = Some(Utc::now());
            })
            .await;

        let store = state.store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SCAN_DURATION).await;
            store
                .update_project(project.id, |p| p.status = ScanStatus::Completed)
                .await;
            tracing::info!(project_id = project.id, "Scan finished");
        });
    }
    Json(serde_json::json!({ "success": true, "message": "Scan started" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureBody {
    name: Option<String>,
    root_path: Option<String>,
    framework: Option<String>,
    language: Option<String>,
    build_tool: Option<String>,
}

/// Register a new project (it becomes current) with zeroed metrics.
async fn handle_configure(
    State(state): State<AppState>,
    Json(body): Json<ConfigureBody>,
) -> (StatusCode, Json<Project>) {
    let project = state
        .store
        .create_project(NewProject {
            name: body.name.filter(|n| !n.is_empty()).unwrap_or_else(|| "New Project".to_string()),
            root_path: body
                .root_path
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "./src".to_string()),
            framework: body.framework,
            language: body.language,
            build_tool: body.build_tool,
            status: ScanStatus::Pending,
        })
        .await;

    state
        .store
        .create_project_metrics(NewProjectMetrics {
            project_id: project.id,
            ..NewProjectMetrics::default()
        })
        .await;

    tracing::info!(project_id = project.id, name = %project.name, "Project configured");
    (StatusCode::CREATED, Json(project))
}

// Conversations

async fn handle_list_conversations(State(state): State<AppState>) -> Json<Vec<Conversation>> {
    Json(state.store.conversations().await)
}

#[derive(Debug, Deserialize)]
struct CreateConversationBody {
    title: Option<String>,
}

async fn handle_create_conversation(
    State(state): State<AppState>,
    Json(body): Json<CreateConversationBody>,
) -> (StatusCode, Json<Conversation>) {
    let conversation = state
        .store
        .create_conversation(NewConversation {
            project_id: None,
            title: body
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "New Chat".to_string()),
        })
        .await;
    (StatusCode::CREATED, Json(conversation))
}

/// Idempotent: deleting an unknown conversation still answers 204.
async fn handle_delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> StatusCode {
    state.store.delete_conversation(id).await;
    StatusCode::NO_CONTENT
}

async fn handle_messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Vec<Message>> {
    Json(state.store.messages(id).await)
}

// Chat

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatBody {
    conversation_id: Option<i64>,
    #[serde(default)]
    message: String,
    image_url: Option<String>,
}

/// Answer a chat turn over SSE.
///
/// Without a configured model the keyword templates answer directly.
/// With one, the upstream completion is opened before the response goes
/// out, so a refused request surfaces as a plain 500 instead of a broken
/// event stream; after that a relay task owns the exchange and the
/// response body just drains its channel.
async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Response, ApiError> {
    let project = state.store.current_project().await;
    let project_id = project.as_ref().map(|p| p.id).unwrap_or(1);

    let exchange = Exchange {
        conversation_id: body.conversation_id,
        message: body.message.clone(),
        image_url: body.image_url.clone(),
    };

    let (events_tx, events_rx) = mpsc::channel::<ChatEvent>(100);

    match &state.model {
        None => {
            let components = state.store.components(project_id).await;
            let services = state.store.services(project_id).await;
            let routes = state.store.routes(project_id).await;
            let flows = state.store.code_flows(project_id).await;
            let text = fallback::respond(
                &body.message,
                &components,
                &services,
                &routes,
                &flows,
                project.as_ref(),
            );
            tokio::spawn(run_fallback_relay(
                text,
                events_tx,
                state.store.clone(),
                exchange,
            ));
        }
        Some(model) => {
            let context = build_project_context(&state.store, project_id).await;
            let system_prompt = compose_system_prompt(&context);

            let mut messages = vec![ChatMessage::system(system_prompt)];
            match body.image_url.as_deref() {
                Some(url) if url.starts_with("data:image") => {
                    let text = if body.message.is_empty() {
                        SCREENSHOT_QUESTION.to_string()
                    } else {
                        body.message.clone()
                    };
                    messages.push(ChatMessage::user_with_image(text, url));
                }
                _ => messages.push(ChatMessage::user(body.message.clone())),
            }

            let upstream = model.stream_chat(messages).await.map_err(|e| {
                tracing::error!("Chat completion request failed: {e:#}");
                ApiError::internal("Failed to process message")
            })?;

            tokio::spawn(run_model_relay(
                upstream,
                events_tx,
                state.store.clone(),
                exchange,
            ));
        }
    }

    let stream = ReceiverStream::new(events_rx).map(|event| Event::default().json_data(event));
    let mut response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}
