use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, ensure};
use serde::Deserialize;
use tmdb_client::TmdbConfig;

use crate::orchestrator::OrchestratorOptions;

/// Application configuration loaded from environment variables
#[derive(Deserialize, Clone)]
pub struct Config {
    /// TMDB API key; only needed for recommendations, not catalog listing
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL for poster images
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// TMDB poster size, e.g. w342 or w500
    #[serde(default = "default_poster_size")]
    pub poster_size: String,

    /// Directory holding movie_list.dat and similarity.bin
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Timeout for each metadata request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound on metadata requests in flight within one recommendation request
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_metadata_cache_capacity")]
    pub metadata_cache_capacity: usize,

    #[serde(default = "default_recommendation_cache_capacity")]
    pub recommendation_cache_capacity: usize,

    /// Largest `count` accepted by the web API
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    tmdb_client::client::DEFAULT_API_URL.to_string()
}

fn default_tmdb_image_url() -> String {
    tmdb_client::client::DEFAULT_IMAGE_URL.to_string()
}

fn default_tmdb_language() -> String {
    tmdb_client::client::DEFAULT_LANGUAGE.to_string()
}

fn default_poster_size() -> String {
    "w342".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_concurrent_fetches() -> usize {
    6
}

fn default_metadata_cache_capacity() -> usize {
    512
}

fn default_recommendation_cache_capacity() -> usize {
    128
}

fn default_max_recommendations() -> usize {
    20
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let config = envy::from_iter::<_, Config>(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())),
        )
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.request_timeout_ms > 0, "REQUEST_TIMEOUT_MS must be positive");
        ensure!(
            self.max_concurrent_fetches > 0,
            "MAX_CONCURRENT_FETCHES must be positive"
        );
        ensure!(
            self.max_recommendations > 0,
            "MAX_RECOMMENDATIONS must be positive"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .context("TMDB_API_KEY is not set")
    }

    pub fn tmdb_config(&self) -> Result<TmdbConfig> {
        Ok(TmdbConfig::new(self.require_api_key()?)
            .with_api_url(self.tmdb_api_url.as_str())
            .with_image_base_url(self.tmdb_image_url.as_str())
            .with_language(self.tmdb_language.as_str())
            .with_timeout(self.request_timeout()))
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            poster_size: self.poster_size.clone(),
            max_concurrent_fetches: self.max_concurrent_fetches,
            fetch_timeout: self.request_timeout(),
            recommendation_cache_capacity: self.recommendation_cache_capacity,
        }
    }
}
