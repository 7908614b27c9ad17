// Streaming relay: folds the upstream delta sequence into client events
// and persists the finished exchange.

use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::schema::{MessageRole, NewMessage};
use crate::store::MemStore;

use super::links::FileReferences;

/// One event on the chat stream. Serializes to exactly one of
/// `{"content": ...}`, `{"fileReferences": [...]}`, `{"done": true}`,
/// `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatEvent {
    Content(String),
    FileReferences(Vec<String>),
    Done(bool),
    Error(String),
}

impl ChatEvent {
    pub fn done() -> Self {
        ChatEvent::Done(true)
    }
}

/// The user turn of one chat exchange, held until the assistant text is
/// complete so both messages persist together.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub conversation_id: Option<i64>,
    pub message: String,
    pub image_url: Option<String>,
}

impl Exchange {
    /// Append the user and assistant turns, in that order. Skipped
    /// entirely when the client named no conversation. The id itself is
    /// not validated against stored conversations.
    pub async fn persist(&self, store: &MemStore, assistant_text: &str, references: Vec<String>) {
        let Some(conversation_id) = self.conversation_id else {
            return;
        };
        store
            .create_message(NewMessage {
                conversation_id,
                role: MessageRole::User,
                content: self.message.clone(),
                image_url: self.image_url.clone(),
                file_references: Vec::new(),
            })
            .await;
        store
            .create_message(NewMessage {
                conversation_id,
                role: MessageRole::Assistant,
                content: assistant_text.to_string(),
                image_url: None,
                file_references: references,
            })
            .await;
        tracing::debug!(conversation_id, "Persisted chat exchange");
    }
}

/// Relay a model stream to the client.
///
/// Each delta is forwarded as a `content` event as soon as it arrives and
/// scanned for markdown link targets. A client that goes away does not
/// stop the fold: sends onto a closed channel are ignored and the
/// upstream keeps draining, so the exchange still persists. An upstream
/// error emits one terminal `error` event and persists nothing. Normal
/// completion persists the exchange, then emits `fileReferences` (only
/// when any were collected) and the final `done`.
pub async fn run_model_relay(
    mut upstream: mpsc::Receiver<Result<String>>,
    events: mpsc::Sender<ChatEvent>,
    store: MemStore,
    exchange: Exchange,
) {
    let mut full_response = String::new();
    let mut references = FileReferences::new();

    while let Some(delta) = upstream.recv().await {
        match delta {
            Ok(content) => {
                full_response.push_str(&content);
                references.scan(&content);
                let _ = events.send(ChatEvent::Content(content)).await;
            }
            Err(e) => {
                tracing::error!("Chat stream failed mid-response: {e:#}");
                let _ = events
                    .send(ChatEvent::Error("Failed to process message".to_string()))
                    .await;
                return;
            }
        }
    }

    let references = references.into_targets();
    exchange.persist(&store, &full_response, references.clone()).await;

    if !references.is_empty() {
        let _ = events.send(ChatEvent::FileReferences(references)).await;
    }
    let _ = events.send(ChatEvent::done()).await;
}

/// Relay a fallback answer: one `content` event carrying the whole text,
/// persistence, then `done`. No link collection happens on this path.
pub async fn run_fallback_relay(
    text: String,
    events: mpsc::Sender<ChatEvent>,
    store: MemStore,
    exchange: Exchange,
) {
    let _ = events.send(ChatEvent::Content(text.clone())).await;
    exchange.persist(&store, &text, Vec::new()).await;
    let _ = events.send(ChatEvent::done()).await;
}
