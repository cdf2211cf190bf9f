//! Types shared by the lookup and its callers.

use data_loader::{MovieId, RowIndex};
use thiserror::Error;

/// A ranked lookup result: one movie similar to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub row_index: RowIndex,
    pub movie_id: MovieId,
    pub title: String,
    /// Similarity to the query movie (higher is more similar)
    pub score: f64,
}

/// Errors returned by the recommendation lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The query title isn't in the catalog (exact match)
    #[error("Movie '{title}' not found in the database")]
    TitleNotFound { title: String },
}
