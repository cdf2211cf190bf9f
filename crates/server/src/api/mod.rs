//! JSON HTTP API over the orchestrator.

mod handlers;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::orchestrator::RecommendationOrchestrator;

pub use handlers::{CatalogEntry, CatalogResponse, HealthResponse};

/// Default page size for `GET /movies`
pub const DEFAULT_PAGE_SIZE: usize = 800;
/// Largest page size accepted by `GET /movies`
pub const MAX_PAGE_SIZE: usize = 5000;
/// Default `count` for `GET /recommendations`
pub const DEFAULT_RECOMMENDATIONS: usize = 7;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: RecommendationOrchestrator,
    /// Largest `count` accepted by `GET /recommendations`
    pub max_recommendations: usize,
}

impl AppState {
    pub fn new(orchestrator: RecommendationOrchestrator, max_recommendations: usize) -> Self {
        Self {
            orchestrator,
            max_recommendations,
        }
    }
}

/// Creates the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/movies", get(handlers::list_movies))
        .route("/recommendations", get(handlers::recommendations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
