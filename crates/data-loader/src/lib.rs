//! # Data Loader Crate
//!
//! Loads and validates the precomputed similarity artifact: the movie
//! catalog plus the square matrix of pairwise similarity scores.
//!
//! ## Main Components
//!
//! - **types**: MovieRecord, SimilarityMatrix, SimilarityStore, CatalogPage
//! - **parser**: read/write movie_list.dat and similarity.bin
//! - **index**: build the store and check its invariants
//! - **error**: ArtifactLoadError
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::SimilarityStore;
//! use std::path::Path;
//!
//! let store = SimilarityStore::load_from_files(Path::new("model"))?;
//! let avatar = store.find_by_title("Avatar").unwrap();
//! let row = store.similarity_row(avatar.row_index).unwrap();
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{ArtifactLoadError, Result};
pub use types::{CatalogPage, MovieId, MovieRecord, RowIndex, SimilarityMatrix, SimilarityStore};
