//! Building and validating the SimilarityStore.
//!
//! Loading is an explicit startup step: parse both files, check that they
//! line up, build the title index. Any inconsistency is an error here rather
//! than a wrong answer later.

use crate::error::{ArtifactLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info, warn};

/// Tolerance used when checking matrix symmetry
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

impl SimilarityStore {
    /// Load the artifact from a model directory.
    ///
    /// Steps:
    /// 1. Parse movie_list.dat and similarity.bin in parallel
    /// 2. Validate alignment between records and matrix
    /// 3. Build the title index
    pub fn load_from_files(model_dir: &Path) -> Result<Self> {
        info!("Loading similarity artifact from {:?}", model_dir);

        let movies_path = model_dir.join(parser::MOVIE_LIST_FILE);
        let matrix_path = model_dir.join(parser::MATRIX_FILE);

        let (records, matrix) = rayon::join(
            || parser::parse_movie_list(&movies_path),
            || parser::parse_matrix(&matrix_path),
        );
        let records = records?;
        let matrix = matrix?;

        info!(
            "Loaded {} movies and a {}x{} similarity matrix",
            records.len(),
            matrix.dimension(),
            matrix.dimension()
        );

        let store = Self::from_parts(records, matrix)?;
        info!("Similarity store built and validated");
        Ok(store)
    }

    /// Assemble a store from already-decoded parts, validating them first
    pub fn from_parts(records: Vec<MovieRecord>, matrix: SimilarityMatrix) -> Result<Self> {
        validate(&records, &matrix)?;

        let title_index = build_title_index(&records);
        if title_index.len() < records.len() {
            debug!(
                "{} records share a title with an earlier record; lookups use the first match",
                records.len() - title_index.len()
            );
        }

        Ok(Self {
            records,
            matrix,
            title_index,
        })
    }
}

/// Check that:
/// - the catalog isn't empty
/// - record count equals matrix dimension
/// - every record's row_index equals its position
/// - the matrix holds dimension² scores
/// - every score is finite
///
/// Asymmetry is only reported, since symmetry is a convention of the
/// producer and not something lookups depend on.
pub fn validate(records: &[MovieRecord], matrix: &SimilarityMatrix) -> Result<()> {
    if records.is_empty() {
        return Err(ArtifactLoadError::ValidationError(
            "catalog is empty".to_string(),
        ));
    }

    if records.len() != matrix.dimension() {
        return Err(ArtifactLoadError::DimensionMismatch {
            records: records.len(),
            dimension: matrix.dimension(),
        });
    }

    if let Some((position, record)) = records
        .iter()
        .enumerate()
        .find(|(position, record)| record.row_index != *position)
    {
        return Err(ArtifactLoadError::RowIndexMismatch {
            position,
            row_index: record.row_index,
        });
    }

    let dimension = matrix.dimension();
    let expected_scores = dimension.checked_mul(dimension);
    if expected_scores != Some(matrix.as_slice().len()) {
        return Err(ArtifactLoadError::ValidationError(format!(
            "matrix of dimension {} holds {} scores",
            dimension,
            matrix.as_slice().len()
        )));
    }

    if let Some(offset) = matrix.as_slice().par_iter().position_any(|v| !v.is_finite()) {
        let value = matrix.as_slice()[offset];
        return Err(ArtifactLoadError::InvalidValue {
            field: format!("similarity[{}][{}]", offset / dimension, offset % dimension),
            value: value.to_string(),
        });
    }

    let asymmetric = count_asymmetric_pairs(matrix);
    if asymmetric > 0 {
        warn!(
            "Similarity matrix has {} asymmetric pairs (tolerance {})",
            asymmetric, SYMMETRY_TOLERANCE
        );
    }

    Ok(())
}

/// Count pairs (i, j), i < j, whose scores differ by more than the tolerance
fn count_asymmetric_pairs(matrix: &SimilarityMatrix) -> usize {
    let dimension = matrix.dimension();
    (0..dimension)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..dimension)
                .filter(|&j| match (matrix.get(i, j), matrix.get(j, i)) {
                    (Some(a), Some(b)) => (a - b).abs() > SYMMETRY_TOLERANCE,
                    _ => false,
                })
                .count()
        })
        .sum()
}

/// Map each title to the row of its first occurrence
fn build_title_index(records: &[MovieRecord]) -> HashMap<String, RowIndex> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        if let Entry::Vacant(slot) = index.entry(record.title.clone()) {
            slot.insert(record.row_index);
        }
    }
    index
}
