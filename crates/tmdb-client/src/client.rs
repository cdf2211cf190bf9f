//! HTTP client for TMDB's movie details endpoint.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use data_loader::MovieId;
use tracing::{debug, info};

use crate::error::MetadataFetchError;
use crate::types::{MovieMetadata, TmdbMovieDetails};
use crate::MetadataProvider;

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the TMDB API
#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_url: String,
    pub image_base_url: String,
    pub language: String,
    /// Upper bound on each request, connect through body
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the API key out of logs
impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("image_base_url", &self.image_base_url)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for TMDB's `GET /movie/{id}`.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        info!("Creating TMDB client for {}", config.api_url);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Building HTTP client for TMDB")?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    fn details_url(&self, movie_id: MovieId) -> String {
        format!("{}/movie/{}", self.config.api_url.trim_end_matches('/'), movie_id)
    }

    fn request_error(&self, movie_id: MovieId, source: reqwest::Error) -> MetadataFetchError {
        if source.is_timeout() {
            MetadataFetchError::Timeout {
                movie_id,
                timeout: self.config.timeout,
            }
        } else {
            MetadataFetchError::Request { movie_id, source }
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn fetch_details(
        &self,
        movie_id: MovieId,
        poster_size: &str,
    ) -> Result<MovieMetadata, MetadataFetchError> {
        debug!("Fetching TMDB details for movie {}", movie_id);

        let response = self
            .http
            .get(self.details_url(movie_id))
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(movie_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataFetchError::Status {
                movie_id,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(movie_id, e))?;

        let details: TmdbMovieDetails =
            serde_json::from_str(&body).map_err(|e| MetadataFetchError::Malformed {
                movie_id,
                reason: e.to_string(),
            })?;

        Ok(MovieMetadata::from_details(
            movie_id,
            details,
            &self.config.image_base_url,
            poster_size,
        ))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
