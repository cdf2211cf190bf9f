//! Fixtures shared by the orchestrator and API tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use data_loader::{MovieId, MovieRecord, SimilarityMatrix, SimilarityStore};
use tmdb_client::{MetadataFetchError, MetadataProvider, MovieMetadata};

/// Six movies, ids 101..=106, where similarity falls off with row distance
pub fn build_store() -> Arc<SimilarityStore> {
    let titles = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"];
    let records = titles
        .iter()
        .enumerate()
        .map(|(row, title)| MovieRecord::new(101 + row as MovieId, *title, row))
        .collect();

    let matrix = SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5],
        vec![0.9, 1.0, 0.9, 0.8, 0.7, 0.6],
        vec![0.8, 0.9, 1.0, 0.9, 0.8, 0.7],
        vec![0.7, 0.8, 0.9, 1.0, 0.9, 0.8],
        vec![0.6, 0.7, 0.8, 0.9, 1.0, 0.9],
        vec![0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
    ])
    .unwrap();

    Arc::new(SimilarityStore::from_parts(records, matrix).unwrap())
}

/// In-memory provider with per-movie delays and 404s.
///
/// Tracks how many calls overlap so tests can check the concurrency bound.
#[derive(Default)]
pub struct ScriptedProvider {
    delays: HashMap<MovieId, Duration>,
    missing: HashSet<MovieId>,
    calls: AtomicUsize,
    finished: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn with_delay(mut self, movie_id: MovieId, delay: Duration) -> Self {
        self.delays.insert(movie_id, delay);
        self
    }

    pub fn with_missing(mut self, movie_id: MovieId) -> Self {
        self.missing.insert(movie_id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran to completion rather than being cancelled
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn fetch_details(
        &self,
        movie_id: MovieId,
        poster_size: &str,
    ) -> Result<MovieMetadata, MetadataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&movie_id) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);

        if self.missing.contains(&movie_id) {
            return Err(MetadataFetchError::Status {
                movie_id,
                status: 404,
            });
        }

        Ok(MovieMetadata {
            movie_id,
            poster_url: Some(format!("https://image.test/{poster_size}/{movie_id}.jpg")),
            homepage_url: None,
            overview: format!("Overview of {movie_id}"),
            release_date: "2001-01-01".to_string(),
            rating: 7.0,
            genres: vec!["Drama".to_string()],
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
