use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use data_loader::MovieId;

use super::{AppState, DEFAULT_PAGE_SIZE, DEFAULT_RECOMMENDATIONS, MAX_PAGE_SIZE};
use crate::error::{ApiError, ApiResult};
use crate::orchestrator::Recommendations;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub movies: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    /// 1-based position in the catalog
    pub position: usize,
    pub movie_id: MovieId,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_movies: usize,
    pub movies: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: Option<String>,
    pub count: Option<usize>,
}

// Handlers

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        movies: state.orchestrator.store().len(),
    })
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<CatalogResponse>> {
    let page_number = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page_size > MAX_PAGE_SIZE {
        return Err(ApiError::InvalidInput(format!(
            "page_size must be at most {}",
            MAX_PAGE_SIZE
        )));
    }

    let page = state
        .orchestrator
        .catalog_page(page_number, page_size)
        .ok_or_else(|| ApiError::InvalidInput("page and page_size must be positive".to_string()))?;

    let movies = page
        .entries
        .iter()
        .enumerate()
        .map(|(offset, record)| CatalogEntry {
            position: page.first_position() + offset,
            movie_id: record.id,
            title: record.title.clone(),
        })
        .collect();

    Ok(Json(CatalogResponse {
        page: page.page_number,
        page_size: page.page_size,
        total_pages: page.total_pages,
        total_movies: page.total_movies,
        movies,
    }))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Json<Recommendations>> {
    let title = query
        .title
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("title is required".to_string()))?;

    let max = state.max_recommendations;
    let count = query.count.unwrap_or(DEFAULT_RECOMMENDATIONS.min(max));
    if count == 0 || count > max {
        return Err(ApiError::InvalidInput(format!(
            "count must be between 1 and {}",
            max
        )));
    }

    info!("Recommendation request: '{}' (count={})", title, count);
    let recommendations = state.orchestrator.get_recommendations(&title, count).await?;

    Ok(Json(recommendations))
}
