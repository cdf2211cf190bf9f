//! Error types for the data-loader crate.
//!
//! Every way the similarity artifact can be unusable maps to one
//! `ArtifactLoadError` variant. All of them are fatal at startup: the
//! process cannot answer lookups without a valid store.

use thiserror::Error;

/// Errors that can occur while loading or validating the similarity artifact
#[derive(Error, Debug)]
pub enum ArtifactLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in the movie list couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// The binary matrix payload couldn't be decoded or encoded
    #[error("Failed to decode {file}: {reason}")]
    DecodeError { file: String, reason: String },

    /// A matrix row has the wrong number of columns
    #[error("Matrix is not square: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Record table and matrix disagree on the number of movies
    #[error("Catalog has {records} movies but the similarity matrix has {dimension} rows")]
    DimensionMismatch { records: usize, dimension: usize },

    /// A record's row index doesn't match its position in the table
    #[error("Record at position {position} declares row index {row_index}")]
    RowIndexMismatch { position: usize, row_index: usize },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ArtifactLoadError>;
