// Configuration structs

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat model configuration (OpenAI-compatible endpoint)
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

/// Chat model configuration. The assistant runs in template-fallback mode
/// unless both `api_key` and `base_url` are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key for the model endpoint
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API, including the version segment
    /// (e.g., "https://api.openai.com/v1")
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model identifier sent with each completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token cap per request
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            max_completion_tokens: default_max_completion_tokens(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_completion_tokens() -> u32 {
    2048
}

impl ModelConfig {
    /// Returns the (api_key, base_url) pair when both are configured and
    /// non-empty. `None` means fallback mode.
    pub fn credentials(&self) -> Option<(String, String)> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let base_url = self.base_url.as_deref().filter(|u| !u.is_empty())?;
        Some((api_key.to_string(), base_url.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
