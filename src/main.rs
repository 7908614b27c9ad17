// Codekt - Knowledge-Transfer Dashboard API
// Main entry point

use anyhow::Result;
use std::sync::Arc;

use codekt::config::load_config;
use codekt::openai::{ChatModel, OpenAiClient};
use codekt::server::ApiServer;
use codekt::store::{seed, MemStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_config()?;

    // Seed the store with the demo project
    let store = MemStore::new();
    let project = seed::load_demo_project(&store).await;
    tracing::info!(project_id = project.id, name = %project.name, "Demo project loaded");

    // Configure the chat model when credentials are present; without
    // them the assistant answers from the keyword templates.
    let model: Option<Arc<dyn ChatModel>> = match config.model.credentials() {
        Some((api_key, base_url)) => {
            let client = OpenAiClient::new(api_key, base_url)?
                .with_model(config.model.model.clone())
                .with_max_completion_tokens(config.model.max_completion_tokens);
            tracing::info!(model = client.name(), "Chat model configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("No model credentials configured; chat runs in fallback mode");
            None
        }
    };

    let server = ApiServer::new(store, model, config.server.bind_address.clone());
    server.serve().await?;

    Ok(())
}
