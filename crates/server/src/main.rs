//! MovieMentor HTTP server.
//!
//! Loads the similarity artifact once, then serves catalog pages and
//! enriched recommendations as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::SimilarityStore;
use server::{AppState, Config, RecommendationOrchestrator, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug")),
        )
        .init();

    info!("Starting MovieMentor server");
    let config = Config::from_env()?;

    let store = Arc::new(
        SimilarityStore::load_from_files(&config.model_dir)
            .with_context(|| format!("Failed to load artifact from {}", config.model_dir.display()))?,
    );
    info!("Loaded {} movies", store.len());

    let orchestrator = RecommendationOrchestrator::from_config(store, &config)?;
    let app = create_router(AppState::new(orchestrator, config.max_recommendations));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
