//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request:
//! 1. Look up the nearest titles (on a blocking worker)
//! 2. Fetch metadata for every candidate concurrently
//! 3. Reassemble results in similarity-rank order
//! 4. Report the candidates whose metadata could not be fetched
//!
//! Metadata calls are bounded two ways: a per-request semaphore caps how
//! many are in flight, and each call gets its own timeout once it holds a
//! permit. The calls run in a `JoinSet` owned by the request, so dropping
//! the request aborts whatever is still running.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use data_loader::{CatalogPage, MovieId, SimilarityStore};
use sources::{Candidate, LookupError, SimilaritySource};
use tmdb_client::{CachedProvider, MetadataFetchError, MetadataProvider, MovieMetadata, TmdbClient};

use crate::config::Config;

/// Final recommendation returned to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    /// 1-based position in the similarity ranking
    pub rank: usize,
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
    pub poster_url: Option<String>,
    pub homepage_url: Option<String>,
    pub overview: String,
    pub release_date: String,
    pub rating: f64,
    pub genres: Vec<String>,
}

impl MovieRecommendation {
    fn new(rank: usize, candidate: Candidate, metadata: MovieMetadata) -> Self {
        Self {
            rank,
            movie_id: candidate.movie_id,
            title: candidate.title,
            score: candidate.score,
            poster_url: metadata.poster_url,
            homepage_url: metadata.homepage_url,
            overview: metadata.overview,
            release_date: metadata.release_date,
            rating: metadata.rating,
            genres: metadata.genres,
        }
    }
}

/// A candidate left out because its metadata fetch failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecommendation {
    pub rank: usize,
    pub movie_id: MovieId,
    pub title: String,
    pub reason: String,
}

/// Result of one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub query: String,
    /// Enriched recommendations, most similar first
    pub items: Vec<MovieRecommendation>,
    pub skipped: Vec<SkippedRecommendation>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Failed to fetch details for all {attempted} recommendations for '{title}'")]
    AllFetchesFailed {
        title: String,
        attempted: usize,
        #[source]
        last_error: MetadataFetchError,
    },

    #[error("Recommendation task failed: {0}")]
    Task(#[from] JoinError),
}

/// Tuning knobs for enrichment
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// TMDB poster size used for poster URLs
    pub poster_size: String,
    /// Metadata calls in flight at once, per request
    pub max_concurrent_fetches: usize,
    /// Per-call deadline, measured from when the call gets a permit
    pub fetch_timeout: Duration,
    /// Lookup cache capacity (0 disables it)
    pub recommendation_cache_capacity: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            poster_size: "w342".to_string(),
            max_concurrent_fetches: 6,
            fetch_timeout: Duration::from_secs(5),
            recommendation_cache_capacity: 128,
        }
    }
}

/// Coordinates lookup and metadata enrichment
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<SimilarityStore>,
    source: SimilaritySource,
    provider: Arc<dyn MetadataProvider>,
    options: OrchestratorOptions,
}

impl RecommendationOrchestrator {
    pub fn new(
        store: Arc<SimilarityStore>,
        provider: Arc<dyn MetadataProvider>,
        options: OrchestratorOptions,
    ) -> Self {
        let source = SimilaritySource::new(store.clone())
            .with_cache_capacity(options.recommendation_cache_capacity);

        info!(
            "Orchestrator ready: {} movies, provider={}, max_concurrent_fetches={}",
            store.len(),
            provider.name(),
            options.max_concurrent_fetches
        );

        Self {
            store,
            source,
            provider,
            options,
        }
    }

    /// Build an orchestrator backed by a cached TMDB client.
    ///
    /// Fails when `TMDB_API_KEY` is not configured.
    pub fn from_config(store: Arc<SimilarityStore>, config: &Config) -> Result<Self> {
        let client = TmdbClient::new(config.tmdb_config()?)?;
        let provider = CachedProvider::new(client, config.metadata_cache_capacity);

        Ok(Self::new(
            store,
            Arc::new(provider),
            config.orchestrator_options(),
        ))
    }

    pub fn store(&self) -> &Arc<SimilarityStore> {
        &self.store
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn catalog_page(&self, page_number: usize, page_size: usize) -> Option<CatalogPage<'_>> {
        self.store.page(page_number, page_size)
    }

    /// Main entry point: the `limit` movies most similar to `title`,
    /// enriched with metadata, most similar first.
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Recommendations, RecommendError> {
        let start_time = Instant::now();

        let candidates = self.find_candidates(title, limit).await?;
        info!("Found {} candidates for '{}'", candidates.len(), title);

        let outcomes = self.fetch_metadata(&candidates).await?;
        let recommendations = assemble(title, candidates, outcomes)?;

        info!(
            "Enriched {} of {} recommendations for '{}' in {:.2?}",
            recommendations.items.len(),
            recommendations.items.len() + recommendations.skipped.len(),
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Run the lookup off the async workers; ranking sorts a full matrix row
    async fn find_candidates(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, RecommendError> {
        let source = self.source.clone();
        let title = title.to_string();

        let candidates =
            tokio::task::spawn_blocking(move || source.recommend(&title, limit)).await??;
        Ok(candidates)
    }

    /// Fetch metadata for every candidate. Outcomes come back in the
    /// candidates' order, whatever order the calls finish in.
    async fn fetch_metadata(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<Result<MovieMetadata, MetadataFetchError>>, RecommendError> {
        let permits = Arc::new(Semaphore::new(self.options.max_concurrent_fetches.max(1)));
        let mut fetches = JoinSet::new();

        for (position, candidate) in candidates.iter().enumerate() {
            let provider = self.provider.clone();
            let permits = permits.clone();
            let poster_size = self.options.poster_size.clone();
            let timeout = self.options.fetch_timeout;
            let movie_id = candidate.movie_id;

            fetches.spawn(async move {
                // Held until the fetch finishes; the semaphore is never closed
                let _permit = permits.acquire_owned().await;
                let outcome =
                    match tokio::time::timeout(timeout, provider.fetch_details(movie_id, &poster_size))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Err(MetadataFetchError::Timeout { movie_id, timeout }),
                    };
                (position, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<MovieMetadata, MetadataFetchError>>> =
            candidates.iter().map(|_| None).collect();
        while let Some(joined) = fetches.join_next().await {
            let (position, outcome) = joined?;
            if let Some(slot) = outcomes.get_mut(position) {
                *slot = Some(outcome);
            }
        }

        Ok(outcomes.into_iter().flatten().collect())
    }
}

/// Pair candidates with their fetch outcomes, keeping rank order
fn assemble(
    title: &str,
    candidates: Vec<Candidate>,
    outcomes: Vec<Result<MovieMetadata, MetadataFetchError>>,
) -> Result<Recommendations, RecommendError> {
    let attempted = candidates.len();
    let mut items = Vec::with_capacity(attempted);
    let mut skipped = Vec::new();
    let mut last_error = None;

    for (position, (candidate, outcome)) in candidates.into_iter().zip(outcomes).enumerate() {
        let rank = position + 1;
        match outcome {
            Ok(metadata) => {
                debug!("Enriched #{} {}", rank, candidate.title);
                items.push(MovieRecommendation::new(rank, candidate, metadata));
            }
            Err(e) => {
                warn!(
                    "Skipping '{}' (movie {}): {}",
                    candidate.title, candidate.movie_id, e
                );
                skipped.push(SkippedRecommendation {
                    rank,
                    movie_id: candidate.movie_id,
                    title: candidate.title,
                    reason: e.to_string(),
                });
                last_error = Some(e);
            }
        }
    }

    if items.is_empty() {
        if let Some(last_error) = last_error {
            return Err(RecommendError::AllFetchesFailed {
                title: title.to_string(),
                attempted,
                last_error,
            });
        }
    }

    Ok(Recommendations {
        query: title.to_string(),
        items,
        skipped,
    })
}
