// HTTP server for the knowledge-transfer dashboard API.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::create_router;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::openai::ChatModel;
use crate::store::MemStore;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: MemStore,
    /// Configured chat model; `None` answers chats from the keyword
    /// templates instead.
    pub model: Option<Arc<dyn ChatModel>>,
}

/// HTTP server lifecycle.
pub struct ApiServer {
    state: AppState,
    bind_address: String,
}

impl ApiServer {
    pub fn new(store: MemStore, model: Option<Arc<dyn ChatModel>>, bind_address: String) -> Self {
        Self {
            state: AppState { store, model },
            bind_address,
        }
    }

    /// Start the HTTP server. Runs until the process stops.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.bind_address.parse()?;

        // Chat turns may inline a base64 screenshot data URL, which blows
        // past the default body limit. CORS stays permissive: the
        // dashboard UI is served from a separate dev origin.
        let app = create_router(self.state)
            .layer(axum::extract::DefaultBodyLimit::max(8 * 1024 * 1024)) // 8MB
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        tracing::info!("Starting knowledge-transfer API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
