// OpenAI-compatible chat-completion client
//
// This module provides the streaming seam between the chat relay and the
// hosted model API. The relay only needs a name and a stream of text
// deltas, so the trait stays deliberately small and tests can substitute
// a scripted stream.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

mod client;
pub mod types;

pub use client::OpenAiClient;
pub use types::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};

/// Trait for streaming chat-completion backends.
///
/// Implemented by `OpenAiClient` for any OpenAI-compatible endpoint.
/// The channel yields text deltas in arrival order and closes when the
/// stream is complete; a transport error is sent at most once and ends
/// the stream.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier used for logging (e.g., "gpt-4o").
    fn name(&self) -> &str;

    /// Start a streaming completion for the given messages.
    ///
    /// Fails before any event is produced when the request cannot be sent
    /// or the API rejects it; after that, errors arrive in-band.
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<Receiver<Result<String>>>;
}
