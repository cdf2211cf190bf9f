//! Metadata client for enriching recommendations with TMDB data.
//!
//! This crate provides:
//! - The `MetadataProvider` trait, the seam between recommendation code and
//!   the external metadata service
//! - `TmdbClient`, one HTTP GET per movie id with a per-request timeout
//! - `CachedProvider`, a bounded LRU read-through cache around any provider
//! - `MetadataFetchError`, carrying the failing movie id and the cause

use async_trait::async_trait;
use data_loader::MovieId;

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use cache::CachedProvider;
pub use client::{TmdbClient, TmdbConfig};
pub use error::MetadataFetchError;
pub use types::{MovieMetadata, TmdbGenre, TmdbMovieDetails};

/// Source of display metadata for a movie.
///
/// `Send + Sync` so one provider can serve concurrent fetches from
/// spawned tasks behind an `Arc`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for `movie_id`, with poster URLs built for
    /// `poster_size` (a TMDB size such as "w342" or "w500").
    async fn fetch_details(
        &self,
        movie_id: MovieId,
        poster_size: &str,
    ) -> Result<MovieMetadata, MetadataFetchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
