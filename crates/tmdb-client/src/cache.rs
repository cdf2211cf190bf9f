//! Read-through cache in front of a metadata provider.
//!
//! The same movie often comes up across lookups in one session, so details
//! are kept per (movie id, poster size). The cache is an LRU with a fixed
//! capacity; failures are never stored, so a later call retries them.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use data_loader::MovieId;
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::MetadataFetchError;
use crate::types::MovieMetadata;
use crate::MetadataProvider;

type CacheKey = (MovieId, String);

pub struct CachedProvider<P> {
    inner: P,
    entries: Mutex<LruCache<CacheKey, MovieMetadata>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: MetadataProvider> CachedProvider<P> {
    /// Wrap `inner`, keeping at most `capacity` entries (minimum 1)
    pub fn new(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[async_trait]
impl<P: MetadataProvider> MetadataProvider for CachedProvider<P> {
    async fn fetch_details(
        &self,
        movie_id: MovieId,
        poster_size: &str,
    ) -> Result<MovieMetadata, MetadataFetchError> {
        let key = (movie_id, poster_size.to_string());

        let cached = self.entries.lock().await.get(&key).cloned();
        if let Some(metadata) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Metadata cache hit for movie {}", movie_id);
            return Ok(metadata);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // Lock is released during the upstream call; concurrent misses for
        // one id may both fetch.
        let metadata = self.inner.fetch_details(movie_id, poster_size).await?;
        self.entries.lock().await.put(key, metadata.clone());

        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Counts upstream calls; fails for movie 404
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataProvider for CountingProvider {
        async fn fetch_details(
            &self,
            movie_id: MovieId,
            poster_size: &str,
        ) -> Result<MovieMetadata, MetadataFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if movie_id == 404 {
                return Err(MetadataFetchError::Status {
                    movie_id,
                    status: 404,
                });
            }
            Ok(MovieMetadata {
                movie_id,
                poster_url: Some(format!("https://img/{poster_size}/{movie_id}.jpg")),
                homepage_url: None,
                overview: format!("Overview of {movie_id}"),
                release_date: "2000-01-01".to_string(),
                rating: 6.5,
                genres: vec!["Drama".to_string()],
            })
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn calls(cache: &CachedProvider<CountingProvider>) -> usize {
        cache.inner().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_hit_skips_upstream() {
        let cache = CachedProvider::new(CountingProvider::default(), 8);

        let first = cache.fetch_details(1, "w342").await.unwrap();
        let second = cache.fetch_details(1, "w342").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls(&cache), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[tokio::test]
    async fn test_poster_size_is_part_of_the_key() {
        let cache = CachedProvider::new(CountingProvider::default(), 8);

        let small = cache.fetch_details(1, "w92").await.unwrap();
        let large = cache.fetch_details(1, "w500").await.unwrap();

        assert_ne!(small.poster_url, large.poster_url);
        assert_eq!(calls(&cache), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = CachedProvider::new(CountingProvider::default(), 8);

        assert!(cache.fetch_details(404, "w342").await.is_err());
        assert!(cache.fetch_details(404, "w342").await.is_err());

        assert_eq!(calls(&cache), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_least_recently_used_entry_is_evicted() {
        let cache = CachedProvider::new(CountingProvider::default(), 2);

        cache.fetch_details(1, "w342").await.unwrap();
        cache.fetch_details(2, "w342").await.unwrap();
        cache.fetch_details(1, "w342").await.unwrap(); // 2 is now least recent
        cache.fetch_details(3, "w342").await.unwrap(); // evicts 2

        assert_eq!(cache.len().await, 2);
        assert_eq!(calls(&cache), 3);

        cache.fetch_details(2, "w342").await.unwrap();
        assert_eq!(calls(&cache), 4);
    }
}
