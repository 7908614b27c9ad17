// Streaming client for OpenAI-compatible chat-completion endpoints.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;

use super::types::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};
use super::ChatModel;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for an OpenAI-compatible chat-completion API.
///
/// `base_url` includes the version segment (e.g., "https://api.openai.com/v1"),
/// the same convention the hosted SDKs use.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_completion_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: "gpt-4o".to_string(),
            max_completion_tokens: 2048,
        })
    }

    /// Set the model identifier sent with each request
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the completion token cap per request
    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = max;
        self
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<mpsc::Receiver<Result<String>>> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            stream: true,
            max_completion_tokens: self.max_completion_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %self.model, "Sending streaming request to chat API");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send streaming request to chat API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Chat API streaming request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let (tx, rx) = mpsc::channel(100);

        // Spawn task to parse the SSE stream
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = Vec::new();
            let mut done = false;

            while let Some(chunk) = stream.next().await {
                if done {
                    break;
                }

                match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);

                        // Parse line by line
                        while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                            let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                            let line = String::from_utf8_lossy(&line_bytes);

                            // SSE format: "data: {...}\n"
                            if let Some(json_str) = line.strip_prefix("data: ") {
                                let json_str = json_str.trim();

                                // End-of-stream marker
                                if json_str == "[DONE]" {
                                    done = true;
                                    break;
                                }

                                if let Ok(parsed) =
                                    serde_json::from_str::<ChatCompletionChunk>(json_str)
                                {
                                    if let Some(choice) = parsed.choices.into_iter().next() {
                                        if let Some(content) = choice.delta.content {
                                            if content.is_empty() {
                                                continue;
                                            }
                                            if tx.send(Ok(content)).await.is_err() {
                                                done = true;
                                                break;
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Stream error: {}", e);
                        let _ = tx.send(Err(e.into())).await;
                        break;
                    }
                }
            }

            tracing::debug!("Chat API streaming task finished");
        });

        Ok(rx)
    }
}
