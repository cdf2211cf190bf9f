use data_loader::MovieId;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching metadata for one movie.
///
/// Every variant carries the movie id so a batch caller can report which
/// recommendation was skipped.
#[derive(Error, Debug)]
pub enum MetadataFetchError {
    #[error("Request for movie {movie_id} failed: {source}")]
    Request {
        movie_id: MovieId,
        #[source]
        source: reqwest::Error,
    },

    #[error("Metadata service returned {status} for movie {movie_id}")]
    Status { movie_id: MovieId, status: u16 },

    #[error("Malformed metadata for movie {movie_id}: {reason}")]
    Malformed { movie_id: MovieId, reason: String },

    #[error("Metadata request for movie {movie_id} timed out after {timeout:?}")]
    Timeout { movie_id: MovieId, timeout: Duration },
}

impl MetadataFetchError {
    pub fn movie_id(&self) -> MovieId {
        match self {
            Self::Request { movie_id, .. }
            | Self::Status { movie_id, .. }
            | Self::Malformed { movie_id, .. }
            | Self::Timeout { movie_id, .. } => *movie_id,
        }
    }

    /// True when the service answered 404 for this id
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
