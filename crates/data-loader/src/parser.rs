//! Readers and writers for the two artifact files:
//! - movie_list.dat: row_index::movie_id::title
//! - similarity.bin: bincode-encoded `Vec<Vec<f64>>`, one inner vector per row
//!
//! The title is the remainder of the line after the second separator, so
//! titles containing "::" survive a round trip.

use crate::error::{ArtifactLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

pub const MOVIE_LIST_FILE: &str = "movie_list.dat";
pub const MATRIX_FILE: &str = "similarity.bin";

const SEPARATOR: &str = "::";

/// Read a whole file, turning a missing file into `FileNotFound`
fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ArtifactLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the movie list file
pub fn parse_movie_list(path: &Path) -> Result<Vec<MovieRecord>> {
    let file = file_label(path);
    let bytes = read_file(path)?;
    let content = String::from_utf8(bytes).map_err(|e| ArtifactLoadError::DecodeError {
        file: file.clone(),
        reason: e.to_string(),
    })?;

    // `lines` strips the "\n" or "\r\n" terminator; the title keeps any
    // other whitespace
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_movie_line(line, &file, idx + 1)?);
    }

    Ok(records)
}

fn parse_movie_line(line: &str, file: &str, line_no: usize) -> Result<MovieRecord> {
    let parse_error = |reason: String| ArtifactLoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason,
    };

    let mut parts = line.splitn(3, SEPARATOR);

    let row_index = parts
        .next()
        .ok_or_else(|| parse_error("Missing row index".to_string()))?;
    let movie_id = parts
        .next()
        .ok_or_else(|| parse_error("Missing movieId".to_string()))?;
    let title = parts
        .next()
        .ok_or_else(|| parse_error("Missing title".to_string()))?;

    if title.is_empty() {
        return Err(parse_error("Empty title".to_string()));
    }

    Ok(MovieRecord {
        id: movie_id
            .parse()
            .map_err(|e| parse_error(format!("Invalid movieId: {}", e)))?,
        title: title.to_string(),
        row_index: row_index
            .parse()
            .map_err(|e| parse_error(format!("Invalid row index: {}", e)))?,
    })
}

/// Decode the similarity matrix file
pub fn parse_matrix(path: &Path) -> Result<SimilarityMatrix> {
    let bytes = read_file(path)?;
    let rows: Vec<Vec<f64>> =
        bincode::deserialize(&bytes).map_err(|e| ArtifactLoadError::DecodeError {
            file: file_label(path),
            reason: e.to_string(),
        })?;

    SimilarityMatrix::from_rows(rows)
}

/// Write records in movie list format, one per line, in slice order.
///
/// Rejects titles that would not read back unchanged: a newline splits the
/// record and a trailing '\r' is taken as part of the line ending.
pub fn write_movie_list(path: &Path, records: &[MovieRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        if record.title.contains('\n') || record.title.ends_with('\r') {
            return Err(ArtifactLoadError::InvalidValue {
                field: "title".to_string(),
                value: record.title.clone(),
            });
        }
        writeln!(
            writer,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            record.row_index, record.id, record.title
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Encode a matrix in the format read by `parse_matrix`
pub fn write_matrix(path: &Path, matrix: &SimilarityMatrix) -> Result<()> {
    let rows: Vec<&[f64]> = matrix.rows().collect();
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &rows).map_err(|e| ArtifactLoadError::DecodeError {
        file: file_label(path),
        reason: e.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}
