//! Core domain types for the similarity artifact.
//!
//! The store is two aligned tables: movie records in row order, and a
//! square matrix whose row `i` holds the similarity of movie `i` to every
//! other movie. The row index is the join key between them.

use crate::error::{ArtifactLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// TMDB identifier of a movie
pub type MovieId = u32;

/// Position of a movie in the record table and the similarity matrix
pub type RowIndex = usize;

// =============================================================================
// Records
// =============================================================================

/// One entry of the movie catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub row_index: RowIndex,
}

impl MovieRecord {
    pub fn new(id: MovieId, title: impl Into<String>, row_index: RowIndex) -> Self {
        Self {
            id,
            title: title.into(),
            row_index,
        }
    }
}

// =============================================================================
// Similarity Matrix
// =============================================================================

/// Square matrix of pairwise similarity scores, stored row-major.
///
/// Only built through `from_rows`, which checks the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build a matrix from nested rows.
    ///
    /// Fails with `RaggedMatrix` if any row length differs from the
    /// number of rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dimension {
                return Err(ArtifactLoadError::RaggedMatrix {
                    row,
                    expected: dimension,
                    found: values.len(),
                });
            }
            scores.extend(values);
        }

        Ok(Self { dimension, scores })
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Similarity scores of `row` against every row, or `None` if out of range
    pub fn row(&self, row: RowIndex) -> Option<&[f64]> {
        if row >= self.dimension {
            return None;
        }
        let start = row * self.dimension;
        self.scores.get(start..start + self.dimension)
    }

    pub fn get(&self, row: RowIndex, col: RowIndex) -> Option<f64> {
        self.row(row)?.get(col).copied()
    }

    /// Iterate rows in order
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and an empty matrix has no rows anyway
        self.scores.chunks_exact(self.dimension.max(1))
    }

    /// All scores in row-major order
    pub fn as_slice(&self) -> &[f64] {
        &self.scores
    }
}

// =============================================================================
// Similarity Store
// =============================================================================

/// The loaded, validated artifact.
///
/// Only constructed through `from_parts` (or `load_from_files`, which calls
/// it), so every instance satisfies the alignment invariants checked in
/// `validate`. Never mutated after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SimilarityStore {
    pub(crate) records: Vec<MovieRecord>,
    pub(crate) matrix: SimilarityMatrix,
    /// Title -> row of the first record carrying that title
    pub(crate) title_index: HashMap<String, RowIndex>,
}

/// One page of the catalog, in row order
#[derive(Debug, Clone, Copy)]
pub struct CatalogPage<'a> {
    /// 1-based page number
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_movies: usize,
    pub entries: &'a [MovieRecord],
}

impl CatalogPage<'_> {
    /// 1-based catalog position of the first entry on this page
    pub fn first_position(&self) -> usize {
        (self.page_number - 1) * self.page_size + 1
    }
}

impl SimilarityStore {
    /// Number of movies in the catalog
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn record(&self, row: RowIndex) -> Option<&MovieRecord> {
        self.records.get(row)
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Exact-match title lookup. With duplicate titles the first record wins.
    pub fn find_by_title(&self, title: &str) -> Option<&MovieRecord> {
        self.title_index
            .get(title)
            .and_then(|&row| self.records.get(row))
    }

    pub fn similarity_row(&self, row: RowIndex) -> Option<&[f64]> {
        self.matrix.row(row)
    }

    /// Slice the catalog into pages of `page_size` (1-based `page_number`).
    ///
    /// Returns `None` for a zero page number or page size. A page past the
    /// end is returned with no entries.
    pub fn page(&self, page_number: usize, page_size: usize) -> Option<CatalogPage<'_>> {
        if page_number == 0 || page_size == 0 {
            return None;
        }

        let total_movies = self.records.len();
        let start = (page_number - 1).saturating_mul(page_size).min(total_movies);
        let end = start.saturating_add(page_size).min(total_movies);

        Some(CatalogPage {
            page_number,
            page_size,
            total_pages: total_movies.div_ceil(page_size),
            total_movies,
            entries: &self.records[start..end],
        })
    }
}
