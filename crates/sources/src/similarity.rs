//! Similarity Source - nearest titles from the precomputed matrix
//!
//! ## Algorithm
//! 1. Resolve the query title to its row (exact match, first wins)
//! 2. Pair every other row with its score in the query's similarity row
//! 3. Stable sort by score descending, so ties keep catalog order
//! 4. Keep the first k
//!
//! Results depend only on (title, k) and the store, which never changes
//! after load, so they can be cached. The cache is an LRU with a fixed
//! capacity rather than an ever-growing memo table.

use crate::types::{Candidate, LookupError};
use data_loader::{MovieRecord, RowIndex, SimilarityStore};
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument};

type CacheKey = (String, usize);

/// Looks up the movies most similar to a given title
#[derive(Clone)]
pub struct SimilaritySource {
    /// Shared reference to the loaded store (read-only, so no lock needed)
    store: Arc<SimilarityStore>,

    /// Recent results keyed by (title, k); `None` when caching is off
    cache: Option<Arc<Mutex<LruCache<CacheKey, Vec<Candidate>>>>>,
}

impl SimilaritySource {
    /// Create a source over a loaded store, without caching
    pub fn new(store: Arc<SimilarityStore>) -> Self {
        Self { store, cache: None }
    }

    /// Keep up to `capacity` recent results (0 disables caching)
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity)
            .map(|capacity| Arc::new(Mutex::new(LruCache::new(capacity))));
        self
    }

    pub fn store(&self) -> &Arc<SimilarityStore> {
        &self.store
    }

    /// Return the `k` movies most similar to `title`, most similar first.
    ///
    /// Never includes the query movie itself. Returns fewer than `k`
    /// candidates when the catalog is smaller than `k + 1`.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Candidate>, LookupError> {
        let query = self
            .store
            .find_by_title(title)
            .ok_or_else(|| LookupError::TitleNotFound {
                title: title.to_string(),
            })?;

        let key = (title.to_string(), k);
        if let Some(hit) = self.cached(&key) {
            debug!("Lookup cache hit for '{}' (k={})", title, k);
            return Ok(hit);
        }

        let candidates = self.rank(query, k);
        debug!(
            "Ranked {} candidates for '{}' (row {})",
            candidates.len(),
            title,
            query.row_index
        );

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, candidates.clone());
        }

        Ok(candidates)
    }

    fn cached(&self, key: &CacheKey) -> Option<Vec<Candidate>> {
        let cache = self.cache.as_ref()?;
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Rank every row except the query's by score, descending
    fn rank(&self, query: &MovieRecord, k: usize) -> Vec<Candidate> {
        if k == 0 {
            return Vec::new();
        }

        // The store validated row_index against the matrix at load time
        let Some(scores) = self.store.similarity_row(query.row_index) else {
            return Vec::new();
        };

        let mut ranked: Vec<(RowIndex, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(row, _)| *row != query.row_index)
            .collect();

        // par_sort_by is a stable merge sort
        ranked.par_sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        ranked
            .into_iter()
            .filter_map(|(row, score)| {
                let record = self.store.record(row)?;
                Some(Candidate {
                    row_index: row,
                    movie_id: record.id,
                    title: record.title.clone(),
                    score,
                })
            })
            .collect()
    }
}
