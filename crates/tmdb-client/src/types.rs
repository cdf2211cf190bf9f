//! TMDB wire format and the metadata handed to front ends.

use data_loader::MovieId;
use serde::{Deserialize, Serialize};

/// The subset of TMDB's `GET /movie/{id}` response this crate depends on.
///
/// `release_date`, `vote_average` and `genres` are required; a payload
/// without them fails to deserialize and is reported as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub poster_path: Option<String>,
    pub homepage: Option<String>,
    pub overview: Option<String>,
    pub release_date: String,
    pub vote_average: f64,
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// Display metadata for one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub movie_id: MovieId,
    pub poster_url: Option<String>,
    /// Only set for absolute http(s) links
    pub homepage_url: Option<String>,
    pub overview: String,
    pub release_date: String,
    /// TMDB vote average, 0-10
    pub rating: f64,
    pub genres: Vec<String>,
}

impl MovieMetadata {
    pub fn from_details(
        movie_id: MovieId,
        details: TmdbMovieDetails,
        image_base_url: &str,
        poster_size: &str,
    ) -> Self {
        Self {
            movie_id,
            poster_url: details
                .poster_path
                .as_deref()
                .and_then(|path| poster_url(image_base_url, poster_size, path)),
            homepage_url: details.homepage.filter(|url| is_http_url(url)),
            overview: details.overview.unwrap_or_default(),
            release_date: details.release_date,
            rating: details.vote_average,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
        }
    }

    /// Genres as a comma separated list
    pub fn genre_list(&self) -> String {
        self.genres.join(", ")
    }
}

/// Build a poster URL such as `https://image.tmdb.org/t/p/w342/abc.jpg`
pub fn poster_url(image_base_url: &str, poster_size: &str, poster_path: &str) -> Option<String> {
    let path = poster_path.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    Some(format!(
        "{}/{}/{}",
        image_base_url.trim_end_matches('/'),
        poster_size,
        path
    ))
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
