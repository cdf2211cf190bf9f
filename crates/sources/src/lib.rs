//! # Sources Crate
//!
//! Recommendation lookup over the precomputed similarity matrix.
//!
//! ## Components
//!
//! ### Similarity Source
//! "Movies like this one":
//! - Exact title match against the catalog
//! - Ranks every other movie by its precomputed similarity score
//! - Stable on ties, so equal scores keep catalog order
//! - Optional bounded LRU cache of recent results
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::SimilaritySource;
//! use data_loader::SimilarityStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SimilarityStore::load_from_files(Path::new("model"))?);
//! let source = SimilaritySource::new(store).with_cache_capacity(128);
//!
//! for candidate in source.recommend("Avatar", 5)? {
//!     println!("{} ({:.3})", candidate.title, candidate.score);
//! }
//! ```

pub mod types;
pub mod similarity;

pub use types::{Candidate, LookupError};
pub use similarity::SimilaritySource;
