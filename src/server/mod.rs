//! HTTP front end for the pipeline.
//!
//! - `POST /api/generate-comic`: streaming mode (`text/event-stream`)
//! - `POST /api/generate-comic/buffered`: one JSON response on completion
//! - `GET /health`
//! - persisted images under the configured URL prefix

pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::{ResolvedConfig, StorageSettings};
use crate::core::Orchestrator;

pub use routes::{BufferedResponse, GenerateRequest};

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Build the application router
pub fn router(state: AppState, storage: &StorageSettings) -> Router {
    let app = Router::new()
        .merge(routes::comic_routes())
        .merge(routes::health_routes())
        .with_state(state);

    let images = ServeDir::new(&storage.public_dir);
    let prefix = storage.url_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        app.fallback_service(images)
    } else {
        app.nest_service(prefix, images)
    }
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ResolvedConfig) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let app = router(AppState::new(orchestrator), &config.storage);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!(
        "Starting web server on http://{}",
        listener.local_addr().context("Failed to read bound address")?
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
