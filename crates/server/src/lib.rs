//! Server crate for MovieMentor.
//!
//! This crate contains the orchestrator that turns a title into enriched
//! recommendations, the environment-driven configuration, and a small JSON
//! HTTP API over both.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;

#[cfg(test)]
mod test_support;

pub use api::{AppState, create_router};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use orchestrator::{
    MovieRecommendation, OrchestratorOptions, RecommendError, RecommendationOrchestrator,
    Recommendations, SkippedRecommendation,
};
